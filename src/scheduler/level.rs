//! Level-based strategy for simple vocabulary flashcards.
//!
//! An item climbs one level per easy recall and waits 2^(level-1) days
//! (capped). "Again" drops it back to level 1; "hard" keeps the level and
//! waits `level` days.

use super::ScheduledReview;
use crate::config::LevelConfig;
use crate::models::{Rating, ReviewStatus, ReviewableItem};
use chrono::{DateTime, Duration, Utc};

/// Days to wait at `level` after an easy recall.
pub fn interval_for_level(level: u32, max_interval_days: u32) -> u32 {
    2u32.checked_pow(level.saturating_sub(1))
        .unwrap_or(u32::MAX)
        .min(max_interval_days)
}

pub fn calculate_next_level(
    item: &ReviewableItem,
    rating: Rating,
    now: DateTime<Utc>,
    config: &LevelConfig,
) -> ScheduledReview {
    let (level, interval, repetitions, status) = match rating {
        Rating::Again => (1, 1, 0, ReviewStatus::Again),
        Rating::Hard => (
            item.level,
            item.level.min(config.max_interval_days),
            item.review_count,
            ReviewStatus::Hard,
        ),
        Rating::Easy => {
            let level = item.level.saturating_add(1);
            (
                level,
                interval_for_level(level, config.max_interval_days),
                item.review_count + 1,
                ReviewStatus::Easy,
            )
        }
    };

    let mut next = item.clone();
    next.level = level;
    next.interval_days = interval;
    next.review_count = repetitions;
    next.mastered = level >= config.mastery_level;
    next.next_review_date = Some(now + Duration::days(interval as i64));
    next.last_reviewed_at = Some(now);
    next.last_status = Some(status);
    next.revision += 1;

    ScheduledReview { item: next, status }
}
