//! Review session orchestration.

pub mod controller;
pub mod metrics;

pub use controller::{ReviewOutcome, ReviewSession, SessionState, SessionStores, SessionSummary};
pub use metrics::apply_session;
