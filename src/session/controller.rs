//! Review session management.
//! Fetches due items, presents them one at a time, schedules each graded item
//! and writes the result back. Items answered incorrectly come back in a
//! further round until the queue is empty.

use super::metrics::apply_session;
use crate::config::{EngineConfig, SessionConfig};
use crate::database::{AttemptStore, ItemStore, MetricsStore};
use crate::error::{Result, ReviewError};
use crate::models::{Grade, ReviewAttempt, ReviewStatus, ReviewableItem, UserMetrics};
use crate::scheduler::{Clock, Scheduler};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    FetchingDue,
    Presenting,
    Scoring,
    Persisting,
}

/// The three stores a session reads from and writes to.
#[derive(Clone)]
pub struct SessionStores {
    pub items: Arc<dyn ItemStore>,
    pub attempts: Arc<dyn AttemptStore>,
    pub metrics: Arc<dyn MetricsStore>,
}

impl SessionStores {
    /// Uses one backend for all three roles.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: ItemStore + AttemptStore + MetricsStore + 'static,
    {
        Self {
            items: store.clone(),
            attempts: store.clone(),
            metrics: store,
        }
    }
}

/// Result of grading the presented item.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    pub item: ReviewableItem,
    pub status: ReviewStatus,
    /// False when the new state could not be written back; the session
    /// keeps using it regardless.
    pub persisted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub reviewed: u64,
    pub correct: u64,
    /// Items whose latest state or attempt never reached the store
    pub unsynced: Vec<String>,
    pub metrics: UserMetrics,
    /// False when the updated metrics could not be read or written back
    pub metrics_persisted: bool,
}

pub struct ReviewSession {
    user_id: String,
    stores: SessionStores,
    clock: Arc<dyn Clock>,
    scheduler: Scheduler,
    config: SessionConfig,
    state: SessionState,
    current: Option<ReviewableItem>,
    presented_at: Option<DateTime<Utc>>,
    queue: VecDeque<ReviewableItem>,
    retry: Vec<ReviewableItem>,
    round_number: usize,
    reviewed: u64,
    correct: u64,
    unsynced: Vec<String>,
}

impl ReviewSession {
    pub fn new(
        user_id: impl Into<String>,
        stores: SessionStores,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            stores,
            clock,
            scheduler: Scheduler::new(config),
            config: config.session,
            state: SessionState::Idle,
            current: None,
            presented_at: None,
            queue: VecDeque::new(),
            retry: Vec::new(),
            round_number: 0,
            reviewed: 0,
            correct: 0,
            unsynced: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_item(&self) -> Option<&ReviewableItem> {
        self.current.as_ref()
    }

    /// Items still to be presented, the current one included.
    pub fn remaining_count(&self) -> usize {
        self.current.iter().count() + self.queue.len() + self.retry.len()
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    /// Loads up to `limit` due items (the configured default when `None`).
    /// Returns how many were fetched.
    pub fn start(&mut self, limit: Option<usize>, category: Option<&str>) -> Result<usize> {
        if self.state != SessionState::Idle {
            return Err(ReviewError::Validation(
                "a review round is already in progress".to_string(),
            ));
        }

        self.state = SessionState::FetchingDue;
        let now = self.clock.now();
        let limit = limit.unwrap_or(self.config.default_limit);

        let due = match self.stores.items.list_due_items(now, limit, category) {
            Ok(due) => due,
            Err(e) => {
                self.state = SessionState::Idle;
                return Err(e);
            }
        };

        let fetched = due.len();
        log::info!(
            "Starting review for {}: {} due item(s){}",
            self.user_id,
            fetched,
            category.map(|c| format!(" in {}", c)).unwrap_or_default()
        );

        self.queue = due.into();
        self.round_number = 1;
        self.advance();
        Ok(fetched)
    }

    /// Grades the presented item, schedules it and writes the new state and
    /// the attempt back. Write failures are logged and reported through
    /// `ReviewOutcome::persisted`; they never abort the session.
    pub fn submit(&mut self, grade: Grade) -> Result<ReviewOutcome> {
        if self.state != SessionState::Presenting {
            return Err(ReviewError::Validation(
                "no item is being presented".to_string(),
            ));
        }
        let Some(current) = self.current.clone() else {
            return Err(ReviewError::Validation(
                "no item is being presented".to_string(),
            ));
        };
        grade.validate()?;

        self.state = SessionState::Scoring;
        let now = self.clock.now();
        let scheduled = match self.scheduler.compute_next(&current, grade, now) {
            Ok(scheduled) => scheduled,
            Err(e) => {
                self.state = SessionState::Presenting;
                return Err(e);
            }
        };

        self.state = SessionState::Persisting;
        let mut attempt = ReviewAttempt::new(
            scheduled.item.id.clone(),
            self.user_id.clone(),
            grade,
            scheduled.item.category.clone(),
            now,
        );
        if let Some(presented_at) = self.presented_at {
            attempt.time_spent_ms = Some((now - presented_at).num_milliseconds().max(0) as u64);
        }

        let attempts = self.config.persist_attempts;
        let item_saved = with_retries("item write", attempts, || {
            self.stores.items.upsert_item(&scheduled.item)
        });
        let attempt_saved = with_retries("attempt append", attempts, || {
            self.stores.attempts.append_attempt(&attempt)
        });

        let conflicted = matches!(item_saved, Err(ReviewError::Concurrency(_)));
        let mut persisted = true;
        for result in [item_saved, attempt_saved] {
            if let Err(e) = result {
                log::warn!(
                    "Failed to persist review of {} for {}: {}",
                    scheduled.item.id,
                    self.user_id,
                    e
                );
                persisted = false;
            }
        }
        if !persisted && !self.unsynced.contains(&scheduled.item.id) {
            self.unsynced.push(scheduled.item.id.clone());
        }

        self.reviewed += 1;
        if grade.is_correct() {
            self.correct += 1;
        } else if self.config.requeue_incorrect {
            if conflicted {
                // another writer owns the item now; retry from its state
                match self.stores.items.get_item(&scheduled.item.id) {
                    Ok(stored) => self.retry.push(stored),
                    Err(e) => log::warn!(
                        "Dropping {} from retry round, reload failed: {}",
                        scheduled.item.id,
                        e
                    ),
                }
            } else {
                // shown again next round, scheduled from the state just computed
                self.retry.push(scheduled.item.clone());
            }
        }

        self.current = None;
        self.advance();

        Ok(ReviewOutcome {
            item: scheduled.item,
            status: scheduled.status,
            persisted,
        })
    }

    /// Ends the session and folds its totals into the learner's metrics,
    /// exactly once. Items not yet graded are dropped without side effects.
    ///
    /// Metrics store failures are logged and reported through
    /// `SessionSummary::metrics_persisted`. When the stored metrics cannot be
    /// read, nothing is written and `metrics` reflects this session alone.
    pub fn finish(self) -> SessionSummary {
        let discarded = self.remaining_count();
        let today = self.clock.now().date_naive();
        let attempts = self.config.persist_attempts;

        let mut metrics_persisted = true;
        let stored = match with_retries("metrics read", attempts, || {
            self.stores.metrics.get_user_metrics(&self.user_id)
        }) {
            Ok(stored) => Some(stored),
            Err(e) => {
                log::warn!("Failed to read metrics for {}: {}", self.user_id, e);
                metrics_persisted = false;
                None
            }
        };

        let metrics = apply_session(
            stored.as_ref().unwrap_or(&UserMetrics::default()),
            self.reviewed,
            self.correct,
            today,
        );
        if stored.is_some() && self.reviewed > 0 {
            let written = with_retries("metrics write", attempts, || {
                self.stores.metrics.upsert_user_metrics(&self.user_id, &metrics)
            });
            if let Err(e) = written {
                log::warn!("Failed to persist metrics for {}: {}", self.user_id, e);
                metrics_persisted = false;
            }
        }

        log::info!(
            "Finished review for {}: {} reviewed, {} correct, {} discarded, {} unsynced",
            self.user_id,
            self.reviewed,
            self.correct,
            discarded,
            self.unsynced.len()
        );

        SessionSummary {
            reviewed: self.reviewed,
            correct: self.correct,
            unsynced: self.unsynced,
            metrics,
            metrics_persisted,
        }
    }

    /// Drops the session without touching learner metrics. Returns how many
    /// items were never graded.
    pub fn abandon(self) -> usize {
        let discarded = self.remaining_count();
        log::info!(
            "Abandoned review for {} with {} item(s) left",
            self.user_id,
            discarded
        );
        discarded
    }

    /// Moves to the next queued item, starting a new round with the items
    /// answered incorrectly once the current round runs out.
    fn advance(&mut self) {
        if self.queue.is_empty() && !self.retry.is_empty() {
            self.queue = std::mem::take(&mut self.retry).into();
            self.round_number += 1;
            log::debug!(
                "Round {}: {} item(s) to retry",
                self.round_number,
                self.queue.len()
            );
        }

        self.current = self.queue.pop_front();
        if self.current.is_some() {
            self.presented_at = Some(self.clock.now());
            self.state = SessionState::Presenting;
        } else {
            self.presented_at = None;
            self.state = SessionState::Idle;
        }
    }
}

/// Runs `op` up to `attempts` times while it fails with a transient error.
fn with_retries<T, F>(what: &str, attempts: u32, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let attempts = attempts.max(1);
    let mut tried = 0;
    loop {
        tried += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && tried < attempts => {
                log::debug!("Retrying {} ({}/{}): {}", what, tried, attempts, e);
            }
            Err(e) => return Err(e),
        }
    }
}
