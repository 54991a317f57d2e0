//! Spaced repetition review engine.
//!
//! Schedules learnable items (vocabulary cards, test questions) with either a
//! level-based or an ease-factor strategy, buckets them into due queues and
//! summarizes a learner's review history.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod session;
pub mod stats;

pub use config::EngineConfig;
pub use error::{Result, ReviewError};
pub use models::{
    AttemptFilter, Grade, ReviewAttempt, ReviewPerformance, ReviewSchedule, ReviewableItem,
    StrategyKind, UserMetrics,
};
pub use scheduler::{Clock, Scheduler};
pub use session::{ReviewSession, SessionStores};
