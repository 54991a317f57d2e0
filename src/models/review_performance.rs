//! Aggregate view of a learner's review history.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub total: usize,
    pub correct: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPerformance {
    pub total_reviews: usize,
    pub correct_reviews: usize,
    /// correct / total, 0 when there are no reviews
    pub efficiency: f64,
    pub streak_days: u32,
    pub reviews_by_category: BTreeMap<String, CategoryStats>,
}
