//! Error types for the review engine
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while scheduling or persisting reviews
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Grade outside its domain or malformed item state
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced item, attempt or learner is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store read/write failure, treated as transient
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Two writers raced on the same item
    #[error("Concurrency conflict: {0}")]
    Concurrency(String),

    /// Configuration file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl ReviewError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReviewError::Persistence(_))
    }
}

impl From<rusqlite::Error> for ReviewError {
    fn from(err: rusqlite::Error) -> Self {
        ReviewError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(err: serde_json::Error) -> Self {
        ReviewError::Persistence(err.to_string())
    }
}

/// Result type alias for review engine operations
pub type Result<T> = std::result::Result<T, ReviewError>;
