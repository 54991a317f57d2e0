//! In-memory backend for guest mode and tests.

use super::store::{AttemptStore, ItemStore, MetricsStore, check_revision, sort_due};
use crate::error::{Result, ReviewError};
use crate::models::{AttemptFilter, ReviewAttempt, ReviewableItem, UserMetrics};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, ReviewableItem>>,
    attempts: Mutex<Vec<ReviewAttempt>>,
    metrics: Mutex<HashMap<String, UserMetrics>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ReviewError::Persistence("memory store lock poisoned".to_string()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store already holding `items`.
    pub fn with_items(items: impl IntoIterator<Item = ReviewableItem>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.items.lock() {
            map.extend(items.into_iter().map(|item| (item.id.clone(), item)));
        }
        store
    }
}

impl ItemStore for MemoryStore {
    fn get_item(&self, id: &str) -> Result<ReviewableItem> {
        lock(&self.items)?
            .get(id)
            .cloned()
            .ok_or_else(|| ReviewError::NotFound(format!("item {}", id)))
    }

    fn list_due_items(
        &self,
        before: DateTime<Utc>,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<ReviewableItem>> {
        let mut due: Vec<ReviewableItem> = lock(&self.items)?
            .values()
            .filter(|item| category.is_none_or(|c| item.category == c))
            .filter(|item| item.is_due(before))
            .cloned()
            .collect();

        sort_due(&mut due);
        due.truncate(limit);
        Ok(due)
    }

    fn list_items(&self, category: Option<&str>) -> Result<Vec<ReviewableItem>> {
        Ok(lock(&self.items)?
            .values()
            .filter(|item| category.is_none_or(|c| item.category == c))
            .cloned()
            .collect())
    }

    fn upsert_item(&self, item: &ReviewableItem) -> Result<()> {
        item.validate()?;
        let mut items = lock(&self.items)?;
        check_revision(item, items.get(&item.id).map(|stored| stored.revision))?;
        items.insert(item.id.clone(), item.clone());
        Ok(())
    }
}

impl AttemptStore for MemoryStore {
    fn append_attempt(&self, attempt: &ReviewAttempt) -> Result<()> {
        attempt.grade.validate()?;
        let mut attempts = lock(&self.attempts)?;
        if attempts.iter().any(|a| a.id == attempt.id) {
            return Err(ReviewError::Validation(format!(
                "attempt {} already recorded",
                attempt.id
            )));
        }
        attempts.push(attempt.clone());
        Ok(())
    }

    fn list_attempts(&self, user_id: &str, filter: &AttemptFilter) -> Result<Vec<ReviewAttempt>> {
        let mut attempts: Vec<ReviewAttempt> = lock(&self.attempts)?
            .iter()
            .filter(|a| a.user_id == user_id && filter.matches(a))
            .cloned()
            .collect();
        attempts.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(attempts)
    }
}

impl MetricsStore for MemoryStore {
    fn get_user_metrics(&self, user_id: &str) -> Result<UserMetrics> {
        Ok(lock(&self.metrics)?
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_user_metrics(&self, user_id: &str, metrics: &UserMetrics) -> Result<()> {
        lock(&self.metrics)?.insert(user_id.to_string(), metrics.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Grade, StrategyKind};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn item(id: &str, category: &str, due_in_days: Option<i64>) -> ReviewableItem {
        let mut item = ReviewableItem::new(id, category, StrategyKind::LevelBased, serde_json::Value::Null);
        item.next_review_date = due_in_days.map(|d| now() + Duration::days(d));
        item
    }

    #[test]
    fn test_get_missing_item() {
        let store = MemoryStore::new();
        assert!(matches!(store.get_item("nope"), Err(ReviewError::NotFound(_))));
    }

    #[test]
    fn test_list_due_items_orders_and_limits() {
        let store = MemoryStore::with_items(vec![
            item("b", "vocabulary", Some(-1)),
            item("a", "vocabulary", Some(-1)),
            item("c", "vocabulary", Some(-3)),
            item("future", "vocabulary", Some(2)),
            item("new", "vocabulary", None),
        ]);

        let due = store.list_due_items(now(), 10, None).unwrap();
        let ids: Vec<_> = due.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "c", "a", "b"]);

        let due = store.list_due_items(now(), 2, None).unwrap();
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn test_list_due_items_by_category() {
        let store = MemoryStore::with_items(vec![
            item("a", "vocabulary", Some(-1)),
            item("b", "grammar", Some(-1)),
        ]);

        let due = store.list_due_items(now(), 10, Some("grammar")).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "b");
    }

    #[test]
    fn test_upsert_rejects_stale_revision() {
        let store = MemoryStore::new();
        let mut first = item("a", "vocabulary", None);
        store.upsert_item(&first).unwrap();

        first.revision = 1;
        store.upsert_item(&first).unwrap();

        // a second writer working from revision 0 also produced revision 1
        let mut racer = item("a", "vocabulary", Some(3));
        racer.revision = 1;
        assert!(matches!(store.upsert_item(&racer), Err(ReviewError::Concurrency(_))));
    }

    #[test]
    fn test_attempts_are_filtered_per_user() {
        let store = MemoryStore::new();
        let grade = Grade::Quality(3);
        store.append_attempt(&ReviewAttempt::new("a", "ola", grade, "vocabulary", now())).unwrap();
        store.append_attempt(&ReviewAttempt::new("a", "jan", grade, "vocabulary", now())).unwrap();
        store.append_attempt(&ReviewAttempt::new("b", "ola", grade, "grammar", now())).unwrap();

        assert_eq!(store.list_attempts("ola", &AttemptFilter::default()).unwrap().len(), 2);
        assert_eq!(store.list_attempts("ola", &AttemptFilter::category("grammar")).unwrap().len(), 1);
    }

    #[test]
    fn test_append_rejects_invalid_grade_and_duplicates() {
        let store = MemoryStore::new();
        let bad = ReviewAttempt::new("a", "ola", Grade::Quality(9), "vocabulary", now());
        assert!(matches!(store.append_attempt(&bad), Err(ReviewError::Validation(_))));

        let ok = ReviewAttempt::new("a", "ola", Grade::Quality(2), "vocabulary", now());
        store.append_attempt(&ok).unwrap();
        assert!(store.append_attempt(&ok).is_err());
    }

    #[test]
    fn test_metrics_default_for_new_learner() {
        let store = MemoryStore::new();
        assert_eq!(store.get_user_metrics("ola").unwrap(), UserMetrics::default());

        let metrics = UserMetrics {
            total_questions: 4,
            correct_answers: 3,
            streak: 2,
            last_activity_date: Some(now().date_naive()),
        };
        store.upsert_user_metrics("ola", &metrics).unwrap();
        assert_eq!(store.get_user_metrics("ola").unwrap(), metrics);
    }
}
