//! Spaced repetition scheduling.
//!
//! Two strategies sit behind one entry point, `Scheduler::compute_next`;
//! the item's `StrategyKind` picks which one runs.

pub mod clock;
pub mod level;
pub mod sm2;

pub use clock::{Clock, FixedClock, SystemClock};

use crate::config::{EaseFactorConfig, EngineConfig, LevelConfig};
use crate::error::Result;
use crate::models::{Grade, ReviewStatus, ReviewableItem, StrategyKind};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// New item state plus the outcome tag for the persistence layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledReview {
    pub item: ReviewableItem,
    pub status: ReviewStatus,
}

/// Interval in days each answer button would give.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntervalPreview {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scheduler {
    ease_factor: EaseFactorConfig,
    level: LevelConfig,
}

impl Scheduler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            ease_factor: config.ease_factor,
            level: config.level,
        }
    }

    /// Creates a never-reviewed item starting at the configured ease factor.
    pub fn new_item(
        &self,
        id: impl Into<String>,
        category: impl Into<String>,
        strategy: StrategyKind,
        content: serde_json::Value,
    ) -> ReviewableItem {
        let mut item = ReviewableItem::new(id, category, strategy, content);
        item.ease_factor = self.ease_factor.default_ease;
        item
    }

    /// Computes the state `item` moves to after being graded at `now`.
    /// Pure: the input is never mutated.
    pub fn compute_next(
        &self,
        item: &ReviewableItem,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<ScheduledReview> {
        item.validate()?;

        match item.strategy {
            StrategyKind::EaseFactor => Ok(sm2::calculate_next_review(
                item,
                grade.to_quality()?,
                now,
                &self.ease_factor,
            )),
            StrategyKind::LevelBased => Ok(level::calculate_next_level(
                item,
                grade.to_rating()?,
                now,
                &self.level,
            )),
        }
    }

    pub fn preview(&self, item: &ReviewableItem, now: DateTime<Utc>) -> Result<IntervalPreview> {
        let interval = |q: u8| -> Result<u32> {
            Ok(self.compute_next(item, Grade::Quality(q), now)?.item.interval_days)
        };
        Ok(IntervalPreview {
            again: interval(0)?,
            hard: interval(2)?,
            good: interval(3)?,
            easy: interval(4)?,
        })
    }
}

/// Format an interval in days as a short label ("5d", "2w", "3mo", "1y").
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}
