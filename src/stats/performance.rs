//! Reduces a learner's attempt history into efficiency, streak and
//! per-category statistics. Only the attempts' own timestamps are consulted.

use crate::models::{AttemptFilter, CategoryStats, ReviewAttempt, ReviewPerformance};
use chrono::{Duration, FixedOffset, NaiveDate, Offset, Utc};
use std::collections::BTreeSet;

/// Summarizes attempts with calendar days taken in UTC.
pub fn summarize(attempts: &[ReviewAttempt]) -> ReviewPerformance {
    summarize_in(attempts, Utc.fix())
}

/// Summarizes attempts with calendar days taken in the learner's offset.
pub fn summarize_in(attempts: &[ReviewAttempt], offset: FixedOffset) -> ReviewPerformance {
    let mut performance = ReviewPerformance {
        total_reviews: attempts.len(),
        ..ReviewPerformance::default()
    };
    let mut active_days = BTreeSet::new();
    let mut correct_days = BTreeSet::new();

    for attempt in attempts {
        let stats: &mut CategoryStats = performance
            .reviews_by_category
            .entry(attempt.category.clone())
            .or_default();
        stats.total += 1;

        let day = attempt.timestamp.with_timezone(&offset).date_naive();
        active_days.insert(day);
        if attempt.is_correct() {
            stats.correct += 1;
            performance.correct_reviews += 1;
            correct_days.insert(day);
        }
    }

    performance.efficiency = if performance.total_reviews > 0 {
        performance.correct_reviews as f64 / performance.total_reviews as f64
    } else {
        0.0
    };
    performance.streak_days = streak_days(&active_days, &correct_days);

    performance
}

/// Applies `filter` before summarizing.
pub fn summarize_filtered(attempts: &[ReviewAttempt], filter: &AttemptFilter) -> ReviewPerformance {
    let selected: Vec<ReviewAttempt> = attempts
        .iter()
        .filter(|a| filter.matches(a))
        .cloned()
        .collect();
    summarize(&selected)
}

/// Consecutive days with a correct answer, walking back from the most recent
/// day with any attempt. Today without activity does not break the streak; a
/// latest day with only wrong answers does.
fn streak_days(active: &BTreeSet<NaiveDate>, correct: &BTreeSet<NaiveDate>) -> u32 {
    let Some(&latest) = active.last() else {
        return 0;
    };

    let mut streak = 0;
    let mut day = latest;
    while correct.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}
