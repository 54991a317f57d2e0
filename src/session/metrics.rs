//! Learner-level counters, folded in once per finished session.
//!
//! The streak here is an activity streak kept on the learner record; it is
//! computed independently of `ReviewPerformance::streak_days`.

use crate::models::UserMetrics;
use chrono::NaiveDate;

/// Applies a finished session's totals to `metrics`.
///
/// With at least one correct answer the streak grows when the last activity
/// was yesterday (or the streak is 0), restarts at 1 after a longer break and
/// stays put for a second session on the same day. Without a correct answer
/// the streak is cleared after a break of more than one day.
pub fn apply_session(
    metrics: &UserMetrics,
    reviewed: u64,
    correct: u64,
    today: NaiveDate,
) -> UserMetrics {
    let mut next = metrics.clone();
    if reviewed == 0 {
        return next;
    }

    next.total_questions += reviewed;
    next.correct_answers += correct;

    let days_since = metrics
        .last_activity_date
        .map(|last| (today - last).num_days());

    next.streak = match (correct > 0, days_since) {
        (true, _) if metrics.streak == 0 => 1,
        (true, Some(1)) => metrics.streak + 1,
        (true, Some(d)) if d > 1 => 1,
        (true, _) => metrics.streak,
        (false, Some(d)) if d > 1 => 0,
        (false, _) => metrics.streak,
    };
    next.last_activity_date = Some(today);

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn metrics(streak: u32, last: Option<NaiveDate>) -> UserMetrics {
        UserMetrics {
            total_questions: 10,
            correct_answers: 7,
            streak,
            last_activity_date: last,
        }
    }

    #[test]
    fn test_first_session_starts_streak() {
        let next = apply_session(&UserMetrics::default(), 5, 3, day(1));
        assert_eq!(next.streak, 1);
        assert_eq!(next.total_questions, 5);
        assert_eq!(next.correct_answers, 3);
        assert_eq!(next.last_activity_date, Some(day(1)));
    }

    #[test]
    fn test_consecutive_day_increments() {
        let next = apply_session(&metrics(4, Some(day(9))), 3, 1, day(10));
        assert_eq!(next.streak, 5);
    }

    #[test]
    fn test_same_day_does_not_inflate() {
        let once = apply_session(&metrics(4, Some(day(9))), 3, 1, day(10));
        let twice = apply_session(&once, 3, 2, day(10));
        assert_eq!(twice.streak, 5);
        assert_eq!(twice.total_questions, 16);
    }

    #[test]
    fn test_break_restarts_at_one() {
        let next = apply_session(&metrics(6, Some(day(2))), 3, 1, day(10));
        assert_eq!(next.streak, 1);
    }

    #[test]
    fn test_no_correct_after_break_clears() {
        let next = apply_session(&metrics(6, Some(day(2))), 3, 0, day(10));
        assert_eq!(next.streak, 0);
        assert_eq!(next.total_questions, 13);
    }

    #[test]
    fn test_no_correct_next_day_keeps_streak() {
        let next = apply_session(&metrics(6, Some(day(9))), 2, 0, day(10));
        assert_eq!(next.streak, 6);
    }

    #[test]
    fn test_empty_session_changes_nothing() {
        let before = metrics(6, Some(day(2)));
        assert_eq!(apply_session(&before, 0, 0, day(10)), before);
    }
}
