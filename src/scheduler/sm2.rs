//! Ease-factor strategy, derived from SM-2 (SuperMemo 2).
//!
//! - Each item has an ease factor (EF) that adjusts after every review
//! - Quality 0: reset interval to 1 day and repetitions to 0
//! - Quality 1-2 (hard): keep the current interval, no growth
//! - Quality 3-4: increase interval progressively (1 day → 6 days → interval × EF)
//! - EF never falls below 1.3

use super::ScheduledReview;
use crate::config::EaseFactorConfig;
use crate::models::{Quality, ReviewStatus, ReviewableItem};
use chrono::{DateTime, Duration, Utc};

/// Starting ease factor for a new item
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Ease factor should not fall below this
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored.
pub fn updated_ease_factor(ease_factor: f64, quality: Quality, floor: f64) -> f64 {
    let miss = 5.0 - quality.value() as f64;
    let new_ef = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
    new_ef.max(floor.max(MIN_EASE_FACTOR))
}

/// Calculates the next state of `item` after a review of the given quality.
/// The input item is left untouched.
pub fn calculate_next_review(
    item: &ReviewableItem,
    quality: Quality,
    now: DateTime<Utc>,
    config: &EaseFactorConfig,
) -> ScheduledReview {
    let new_ef = updated_ease_factor(item.ease_factor, quality, config.min_ease);

    let (interval, repetitions, status) = match quality.value() {
        // Forgotten: start from the beginning
        0 => (1, 0, ReviewStatus::Again),
        // Hard: repeat the current interval
        1 | 2 => (item.interval_days, item.review_count, ReviewStatus::Hard),
        q => {
            let repetitions = item.review_count + 1;
            let interval = match repetitions {
                1 => 1,
                2 => 6,
                _ => (item.interval_days as f64 * item.ease_factor).round() as u32,
            };
            let status = if q == 4 {
                ReviewStatus::Easy
            } else {
                ReviewStatus::Good
            };
            (interval, repetitions, status)
        }
    };
    let interval = interval.clamp(1, config.max_interval_days.max(1));

    let mut next = item.clone();
    next.ease_factor = new_ef;
    next.interval_days = interval;
    next.review_count = repetitions;
    next.next_review_date = Some(now + Duration::days(interval as i64));
    next.last_reviewed_at = Some(now);
    next.last_status = Some(status);
    next.revision += 1;

    ScheduledReview { item: next, status }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrategyKind;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn question() -> ReviewableItem {
        ReviewableItem::new(
            "q-1",
            "grammar",
            StrategyKind::EaseFactor,
            serde_json::json!({"prompt": "Odmień 'być'"}),
        )
    }

    fn review(item: &ReviewableItem, q: u8) -> ScheduledReview {
        calculate_next_review(
            item,
            Quality::new(q).unwrap(),
            now(),
            &EaseFactorConfig::default(),
        )
    }

    #[test]
    fn test_first_good_review() {
        let next = review(&question(), 3);
        assert_eq!(next.item.review_count, 1);
        assert_eq!(next.item.interval_days, 1);
        assert_eq!(next.item.next_review_date, Some(now() + Duration::days(1)));
        assert_eq!(next.status, ReviewStatus::Good);
    }

    #[test]
    fn test_second_good_review() {
        let first = review(&question(), 3);
        let second = review(&first.item, 3);
        assert_eq!(second.item.review_count, 2);
        assert_eq!(second.item.interval_days, 6);
        assert_eq!(second.item.next_review_date, Some(now() + Duration::days(6)));
    }

    #[test]
    fn test_failure_after_success_resets() {
        let first = review(&question(), 3);
        let second = review(&first.item, 3);
        let failed = review(&second.item, 0);

        assert_eq!(failed.item.interval_days, 1);
        assert_eq!(failed.item.review_count, 0);
        assert!(failed.item.ease_factor <= second.item.ease_factor);
        assert!(failed.item.ease_factor >= MIN_EASE_FACTOR);
        assert_eq!(failed.status, ReviewStatus::Again);
    }

    #[test]
    fn test_subsequent_review_multiplies_interval() {
        let mut item = question();
        item.review_count = 2;
        item.interval_days = 6;
        item.ease_factor = 2.5;

        let next = review(&item, 4);
        // 6 * 2.5 = 15
        assert_eq!(next.item.interval_days, 15);
        assert_eq!(next.item.review_count, 3);
        assert_eq!(next.status, ReviewStatus::Easy);
    }

    #[test]
    fn test_hard_keeps_interval_and_lowers_ease() {
        let mut item = question();
        item.review_count = 4;
        item.interval_days = 12;
        item.last_reviewed_at = Some(now() - Duration::days(12));

        let next = review(&item, 1);
        assert_eq!(next.item.interval_days, 12);
        assert_eq!(next.item.review_count, 4);
        assert!(next.item.ease_factor < item.ease_factor);
        assert_eq!(next.status, ReviewStatus::Hard);
    }

    #[test]
    fn test_hard_on_new_item_waits_a_day() {
        let next = review(&question(), 2);
        assert_eq!(next.item.interval_days, 1);
        assert_eq!(next.item.review_count, 0);
    }

    #[test]
    fn test_ease_factor_floor() {
        let mut item = question();
        for _ in 0..10 {
            item = review(&item, 0).item;
        }
        assert!(item.ease_factor >= MIN_EASE_FACTOR);
        assert!((item.ease_factor - MIN_EASE_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn test_interval_capped() {
        let mut item = question();
        item.review_count = 10;
        item.interval_days = 300;
        item.ease_factor = 2.5;

        let next = review(&item, 4);
        assert_eq!(next.item.interval_days, 365);
    }

    #[test]
    fn test_input_not_mutated() {
        let item = question();
        let next = review(&item, 4);
        assert_eq!(item.review_count, 0);
        assert!(item.next_review_date.is_none());
        assert_eq!(next.item.revision, item.revision + 1);
    }
}
