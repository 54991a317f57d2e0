//! Learner-level rolling counters, updated once per finished session.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetrics {
    pub total_questions: u64,
    pub correct_answers: u64,
    pub streak: u32,
    /// Day (UTC) of the last session that scored at least one item
    pub last_activity_date: Option<NaiveDate>,
}
