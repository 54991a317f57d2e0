pub mod grade;
pub mod review_attempt;
pub mod review_performance;
pub mod review_schedule;
pub mod reviewable_item;
pub mod user_metrics;

pub use grade::{Grade, Quality, Rating, ReviewStatus};
pub use review_attempt::{AttemptFilter, ReviewAttempt};
pub use review_performance::{CategoryStats, ReviewPerformance};
pub use review_schedule::ReviewSchedule;
pub use reviewable_item::{ReviewableItem, StrategyKind};
pub use user_metrics::UserMetrics;
