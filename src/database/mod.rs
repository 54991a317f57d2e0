//! Persistence for items, attempts and learner metrics.

pub mod db;
pub mod memory;
pub mod store;

pub use db::SqliteStore;
pub use memory::MemoryStore;
pub use store::{AttemptStore, ItemStore, MetricsStore};
