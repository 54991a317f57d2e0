//! Storage abstractions the review engine is composed with.
//!
//! Backends may be remote or device-resident; the scheduler and aggregators
//! never see which one is in use.

use crate::error::{Result, ReviewError};
use crate::models::{AttemptFilter, ReviewAttempt, ReviewableItem, UserMetrics};
use chrono::{DateTime, Utc};

pub trait ItemStore: Send + Sync {
    /// Fails with `NotFound` when the item does not exist.
    fn get_item(&self, id: &str) -> Result<ReviewableItem>;

    /// At most `limit` items due at or before `before`, oldest due date first
    /// (ties by id). Items never scheduled count as due and come first.
    fn list_due_items(
        &self,
        before: DateTime<Utc>,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<ReviewableItem>>;

    /// Snapshot of every item, optionally restricted to one category.
    fn list_items(&self, category: Option<&str>) -> Result<Vec<ReviewableItem>>;

    /// Inserts or replaces an item. Rejects a write that was not scheduled
    /// from the stored revision with `Concurrency`.
    fn upsert_item(&self, item: &ReviewableItem) -> Result<()>;
}

pub trait AttemptStore: Send + Sync {
    fn append_attempt(&self, attempt: &ReviewAttempt) -> Result<()>;

    /// Attempts by `user_id` matching `filter`, oldest first.
    fn list_attempts(&self, user_id: &str, filter: &AttemptFilter) -> Result<Vec<ReviewAttempt>>;
}

pub trait MetricsStore: Send + Sync {
    /// A learner without stored metrics gets zeroed metrics.
    fn get_user_metrics(&self, user_id: &str) -> Result<UserMetrics>;

    fn upsert_user_metrics(&self, user_id: &str, metrics: &UserMetrics) -> Result<()>;
}

/// Shared optimistic-concurrency check for item writes. A write must carry
/// exactly the stored revision plus one; unreviewed items (revision 0) may
/// be rewritten freely.
pub(crate) fn check_revision(item: &ReviewableItem, stored: Option<u64>) -> Result<()> {
    match stored {
        None => Ok(()),
        Some(0) if item.revision == 0 => Ok(()),
        Some(stored) if item.revision == stored + 1 => Ok(()),
        Some(stored) => Err(ReviewError::Concurrency(format!(
            "item {} at revision {} was not scheduled from stored revision {}",
            item.id, item.revision, stored
        ))),
    }
}

/// Due-list ordering: unscheduled first, then by date, then by id.
pub(crate) fn sort_due(items: &mut [ReviewableItem]) {
    items.sort_by(|a, b| {
        a.next_review_date
            .cmp(&b.next_review_date)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrategyKind;
    use chrono::TimeZone;

    fn item(id: &str, revision: u64) -> ReviewableItem {
        let mut item = ReviewableItem::new(id, "vocabulary", StrategyKind::LevelBased, serde_json::Value::Null);
        item.revision = revision;
        item
    }

    #[test]
    fn test_revision_check() {
        assert!(check_revision(&item("a", 0), None).is_ok());
        assert!(check_revision(&item("a", 3), Some(2)).is_ok());
        assert!(matches!(
            check_revision(&item("a", 2), Some(2)),
            Err(ReviewError::Concurrency(_))
        ));
        assert!(check_revision(&item("a", 1), Some(4)).is_err());
    }

    #[test]
    fn test_revision_must_follow_stored_one() {
        // a writer that skipped past the stored state is still stale
        assert!(matches!(
            check_revision(&item("a", 3), Some(1)),
            Err(ReviewError::Concurrency(_))
        ));
        assert!(check_revision(&item("a", 2), Some(1)).is_ok());
    }

    #[test]
    fn test_unreviewed_items_may_be_rewritten() {
        // content edits before the first review keep revision 0
        assert!(check_revision(&item("a", 0), Some(0)).is_ok());
    }

    #[test]
    fn test_sort_due() {
        let day = |d| Some(Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap());
        let mut a = item("b", 0);
        a.next_review_date = day(2);
        let mut b = item("a", 0);
        b.next_review_date = day(2);
        let mut c = item("c", 0);
        c.next_review_date = day(1);
        let d = item("z", 0);

        let mut items = vec![a, b, c, d];
        sort_due(&mut items);
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "c", "a", "b"]);
    }
}
