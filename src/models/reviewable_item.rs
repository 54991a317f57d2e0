//! A learnable item (vocabulary card or test question) together with its
//! spaced repetition state.
use super::ReviewStatus;
use crate::error::{Result, ReviewError};
use crate::scheduler::sm2::{DEFAULT_EASE_FACTOR, MIN_EASE_FACTOR};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which scheduling strategy drives an item. Chosen per content domain:
/// simple vocabulary flashcards use levels, questions use ease factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[default]
    LevelBased,
    EaseFactor,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::LevelBased => "level-based",
            StrategyKind::EaseFactor => "ease-factor",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "level-based" | "level" => Ok(StrategyKind::LevelBased),
            "ease-factor" | "ease" | "sm2" => Ok(StrategyKind::EaseFactor),
            other => Err(ReviewError::Validation(format!(
                "unknown strategy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewableItem {
    pub id: String,
    /// Content type tag, e.g. "vocabulary" or "grammar"
    pub category: String,
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Opaque to the engine
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub interval_days: u32,
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Consecutive successful reviews
    #[serde(default)]
    pub review_count: u32,
    pub next_review_date: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub mastered: bool,
    /// Outcome of the most recent review
    #[serde(default)]
    pub last_status: Option<ReviewStatus>,
    /// Bumped on every scheduled review; stores reject stale writes
    #[serde(default)]
    pub revision: u64,
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

fn default_level() -> u32 {
    1
}

impl ReviewableItem {
    /// Creates an item on first exposure: never reviewed, not yet scheduled.
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        strategy: StrategyKind,
        content: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            strategy,
            content,
            interval_days: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            review_count: 0,
            next_review_date: None,
            last_reviewed_at: None,
            level: 1,
            mastered: false,
            last_status: None,
            revision: 0,
        }
    }

    pub fn is_new(&self) -> bool {
        self.last_reviewed_at.is_none()
    }

    /// Unscheduled items are due immediately.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date.is_none_or(|date| date <= now)
    }

    /// Rejects state the scheduler cannot work from.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ReviewError::Validation("item id is empty".to_string()));
        }
        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE_FACTOR {
            return Err(ReviewError::Validation(format!(
                "item {} has ease factor {} below the {} floor",
                self.id, self.ease_factor, MIN_EASE_FACTOR
            )));
        }
        if self.level == 0 {
            return Err(ReviewError::Validation(format!(
                "item {} has level 0",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn item() -> ReviewableItem {
        ReviewableItem::new(
            "cześć",
            "vocabulary",
            StrategyKind::LevelBased,
            json!({"term": "cześć", "definition": "hello"}),
        )
    }

    #[test]
    fn test_new_item_defaults() {
        let item = item();
        assert_eq!(item.ease_factor, 2.5);
        assert_eq!(item.review_count, 0);
        assert_eq!(item.level, 1);
        assert!(item.is_new());
        assert!(!item.mastered);
        assert!(item.next_review_date.is_none());
    }

    #[test]
    fn test_unscheduled_item_is_due() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut item = item();
        assert!(item.is_due(now));

        item.next_review_date = Some(now + chrono::Duration::hours(1));
        assert!(!item.is_due(now));
    }

    #[test]
    fn test_validate_rejects_low_ease() {
        let mut item = item();
        item.ease_factor = 1.1;
        assert!(matches!(item.validate(), Err(ReviewError::Validation(_))));

        item.ease_factor = f64::NAN;
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_level_zero_and_empty_id() {
        let mut zero_level = item();
        zero_level.level = 0;
        assert!(zero_level.validate().is_err());

        let mut blank_id = item();
        blank_id.id = "  ".to_string();
        assert!(blank_id.validate().is_err());
    }

    #[test]
    fn test_strategy_kind_parsing() {
        assert_eq!("level".parse::<StrategyKind>().unwrap(), StrategyKind::LevelBased);
        assert_eq!("ease-factor".parse::<StrategyKind>().unwrap(), StrategyKind::EaseFactor);
        assert!("fsrs".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let value = serde_json::to_value(item()).unwrap();
        assert_eq!(value["intervalDays"], 0);
        assert_eq!(value["strategy"], "level-based");
        assert!(value["nextReviewDate"].is_null());
    }
}
