//! One append-only review event.
use super::Grade;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAttempt {
    pub id: String,
    pub item_id: String,
    pub user_id: String,
    pub grade: Grade,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent_ms: Option<u64>,
}

impl ReviewAttempt {
    pub fn new(
        item_id: impl Into<String>,
        user_id: impl Into<String>,
        grade: Grade,
        category: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            user_id: user_id.into(),
            grade,
            category: category.into(),
            timestamp,
            time_spent_ms: None,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.grade.is_correct()
    }
}

/// Narrows `AttemptStore::list_attempts` and aggregation input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttemptFilter {
    pub category: Option<String>,
    pub item_id: Option<String>,
    /// Inclusive lower bound
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound
    pub until: Option<DateTime<Utc>>,
}

impl AttemptFilter {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, attempt: &ReviewAttempt) -> bool {
        self.category.as_ref().is_none_or(|c| *c == attempt.category)
            && self.item_id.as_ref().is_none_or(|id| *id == attempt.item_id)
            && self.since.is_none_or(|since| attempt.timestamp >= since)
            && self.until.is_none_or(|until| attempt.timestamp < until)
    }
}
