//! Recall signals fed to the scheduler.
//!
//! Three shapes are accepted:
//! - `Quality(q)`: 0-4 ordinal (0 = total failure, 1-2 = hard, 3 = good, 4 = easy)
//! - `Rating(r)`: coarse level-based rating (0 = again, 1 = hard, anything
//!   higher = easy)
//! - `Correct(b)`: plain right/wrong answer to a test question
//!
//! Every shape converts to both the quality scale and the rating scale, so any
//! strategy can be driven by any signal.

use crate::error::{Result, ReviewError};
use serde::{Deserialize, Serialize};

/// Highest value on the quality scale
pub const MAX_QUALITY: u8 = 4;

/// Lowest quality counted as a correct recall
pub const PASSING_QUALITY: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Grade {
    Quality(u8),
    Rating(u8),
    Correct(bool),
}

impl Grade {
    pub fn is_correct(&self) -> bool {
        match *self {
            Grade::Quality(q) => q >= PASSING_QUALITY,
            Grade::Rating(r) => r >= 1,
            Grade::Correct(correct) => correct,
        }
    }

    /// Checks the raw value against its domain.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Grade::Quality(q) => Quality::new(q).map(|_| ()),
            Grade::Rating(_) | Grade::Correct(_) => Ok(()),
        }
    }

    pub fn to_quality(self) -> Result<Quality> {
        match self {
            Grade::Quality(q) => Quality::new(q),
            Grade::Rating(r) => Ok(match Rating::from(r) {
                Rating::Again => Quality(0),
                Rating::Hard => Quality(2),
                Rating::Easy => Quality(MAX_QUALITY),
            }),
            Grade::Correct(true) => Ok(Quality(PASSING_QUALITY)),
            Grade::Correct(false) => Ok(Quality(0)),
        }
    }

    pub fn to_rating(self) -> Result<Rating> {
        match self {
            Grade::Rating(r) => Ok(Rating::from(r)),
            Grade::Quality(q) => Ok(match Quality::new(q)?.value() {
                0 => Rating::Again,
                1 | 2 => Rating::Hard,
                _ => Rating::Easy,
            }),
            Grade::Correct(true) => Ok(Rating::Easy),
            Grade::Correct(false) => Ok(Rating::Again),
        }
    }
}

/// A validated 0-4 recall quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Self> {
        if value > MAX_QUALITY {
            return Err(ReviewError::Validation(format!(
                "quality {} is outside 0..={}",
                value, MAX_QUALITY
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Coarse rating used by the level-based strategy. Any value above 1 is easy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Again,
    Hard,
    Easy,
}

impl From<u8> for Rating {
    fn from(value: u8) -> Self {
        match value {
            0 => Rating::Again,
            1 => Rating::Hard,
            _ => Rating::Easy,
        }
    }
}

/// Outcome tag written alongside the new item state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewStatus {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Again => "again",
            ReviewStatus::Hard => "hard",
            ReviewStatus::Good => "good",
            ReviewStatus::Easy => "easy",
        }
    }
}
