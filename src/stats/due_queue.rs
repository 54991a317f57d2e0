//! Buckets an item snapshot into due queues relative to "now".
//!
//! Day boundaries are UTC. Windows are half-open and measured from the end of
//! today: "this week" is everything before `end_of_today + 7d` and therefore
//! includes everything due today, "next week" is `[end_of_today + 7d,
//! end_of_today + 14d)`. Items that were never scheduled are not counted.

use crate::models::{ReviewSchedule, ReviewableItem};
use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Start of the UTC day after `now`.
pub fn end_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    start + Duration::days(1)
}

pub fn build_schedule(items: &[ReviewableItem], now: DateTime<Utc>) -> ReviewSchedule {
    let end_of_today = end_of_day(now);
    let end_of_week = end_of_today + Duration::days(7);
    let end_of_next_week = end_of_today + Duration::days(14);

    let mut schedule = ReviewSchedule::default();

    for date in items.iter().filter_map(|item| item.next_review_date) {
        if date < end_of_today {
            schedule.due_today += 1;
        }
        if date < end_of_week {
            schedule.due_this_week += 1;
        } else if date < end_of_next_week {
            schedule.due_next_week += 1;
        }

        let key = date.date_naive().format("%Y-%m-%d").to_string();
        *schedule.due_by_date.entry(key).or_insert(0) += 1;
    }

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrategyKind;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap()
    }

    fn due_at(id: &str, date: Option<DateTime<Utc>>) -> ReviewableItem {
        let mut item = ReviewableItem::new(id, "vocabulary", StrategyKind::LevelBased, serde_json::Value::Null);
        item.next_review_date = date;
        item
    }

    fn snapshot() -> Vec<ReviewableItem> {
        let at = |y, m, d, h| Some(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap());
        vec![
            due_at("overdue", at(2024, 2, 20, 8)),
            due_at("earlier-today", at(2024, 3, 1, 6)),
            due_at("late-tonight", at(2024, 3, 1, 23)),
            due_at("tomorrow", at(2024, 3, 2, 0)),
            due_at("in-a-week", at(2024, 3, 8, 23)),
            due_at("next-week-start", at(2024, 3, 9, 0)),
            due_at("next-week-end", at(2024, 3, 15, 23)),
            due_at("far", at(2024, 3, 16, 0)),
            due_at("unscheduled", None),
        ]
    }

    #[test]
    fn test_buckets() {
        let schedule = build_schedule(&snapshot(), now());
        assert_eq!(schedule.due_today, 3);
        assert_eq!(schedule.due_this_week, 5);
        assert_eq!(schedule.due_next_week, 2);
    }

    #[test]
    fn test_this_week_includes_today() {
        let schedule = build_schedule(&snapshot(), now());
        assert!(schedule.due_this_week >= schedule.due_today);
    }

    #[test]
    fn test_due_by_date_skips_unscheduled() {
        let schedule = build_schedule(&snapshot(), now());
        assert_eq!(schedule.due_by_date.get("2024-03-01"), Some(&2));
        assert_eq!(schedule.due_by_date.get("2024-02-20"), Some(&1));
        assert_eq!(schedule.due_by_date.values().sum::<usize>(), 8);
    }

    #[test]
    fn test_idempotent() {
        let items = snapshot();
        assert_eq!(build_schedule(&items, now()), build_schedule(&items, now()));
    }

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(build_schedule(&[], now()), ReviewSchedule::default());
    }

    #[test]
    fn test_end_of_day() {
        assert_eq!(end_of_day(now()), Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
    }
}
