//! Pure aggregations over item and attempt snapshots.

pub mod due_queue;
pub mod performance;

pub use due_queue::build_schedule;
pub use performance::{summarize, summarize_filtered, summarize_in};
