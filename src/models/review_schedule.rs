//! Due-queue counts derived from an item snapshot.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSchedule {
    /// Due before the end of today (UTC), overdue included
    pub due_today: usize,
    /// Due within seven days after today; includes `due_today`
    pub due_this_week: usize,
    /// Due in the seven days after that
    pub due_next_week: usize,
    /// ISO date (YYYY-MM-DD) -> number of items scheduled on it
    pub due_by_date: BTreeMap<String, usize>,
}
