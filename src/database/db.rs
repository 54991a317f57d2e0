//! SQLite backend for the review engine
//!
//! Handles database initialization, item/attempt/metrics persistence and a
//! simulated "current date" that can be advanced a day at a time, so a
//! learner can walk their schedule forward.
//!
//! Item and attempt timestamps are stored as Unix milliseconds; the simulated
//! current date is kept in whole seconds.

use super::store::{AttemptStore, ItemStore, MetricsStore, check_revision};
use crate::error::{Result, ReviewError};
use crate::models::{
    AttemptFilter, Grade, ReviewAttempt, ReviewStatus, ReviewableItem, StrategyKind, UserMetrics,
};
use crate::scheduler::Clock;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const ITEM_COLUMNS: &str = "id, category, strategy, content, interval_days, ease_factor, review_count,
     next_review_date, last_reviewed_at, level, mastered, last_status, revision";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        log::debug!("Opened review database at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_database(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ReviewError::Persistence("database lock poisoned".to_string()))
    }

    /// Retrieves the simulated current date
    pub fn get_current_date(&self) -> Result<DateTime<Utc>> {
        let conn = self.conn()?;
        let timestamp: String = conn.query_row(
            "SELECT value FROM app_state WHERE key = 'current_date'",
            [],
            |row| row.get(0),
        )?;

        let secs = timestamp.parse::<i64>().map_err(|e| {
            ReviewError::Persistence(format!("bad current_date '{}': {}", timestamp, e))
        })?;
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| ReviewError::Persistence(format!("current_date {} out of range", secs)))
    }

    /// Advances the simulated current date by 24 hours
    pub fn advance_day(&self) -> Result<DateTime<Utc>> {
        let next_day = self.get_current_date()? + Duration::days(1);
        self.conn()?.execute(
            "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
            params![next_day.timestamp().to_string()],
        )?;
        Ok(next_day)
    }
}

/// Creates tables for items, attempts, learner metrics and app state.
/// Sets the current date to now if not already initialized.
fn init_database(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            strategy TEXT NOT NULL,
            content TEXT NOT NULL,
            interval_days INTEGER NOT NULL DEFAULT 0,
            ease_factor REAL NOT NULL DEFAULT 2.5,
            review_count INTEGER NOT NULL DEFAULT 0,
            next_review_date INTEGER,
            last_reviewed_at INTEGER,
            level INTEGER NOT NULL DEFAULT 1,
            mastered INTEGER NOT NULL DEFAULT 0,
            last_status TEXT,
            revision INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_items_due ON items(next_review_date, id);

        CREATE TABLE IF NOT EXISTS attempts (
            id TEXT PRIMARY KEY,
            item_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            grade TEXT NOT NULL,
            category TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            time_spent_ms INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_attempts_user ON attempts(user_id, timestamp);

        CREATE TABLE IF NOT EXISTS user_metrics (
            user_id TEXT PRIMARY KEY,
            total_questions INTEGER NOT NULL DEFAULT 0,
            correct_answers INTEGER NOT NULL DEFAULT 0,
            streak INTEGER NOT NULL DEFAULT 0,
            last_activity_date TEXT
        );

        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![Utc::now().timestamp().to_string()],
    )?;

    Ok(())
}

fn conversion_error(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn from_millis(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<i64>>(idx)?
        .map(|millis| from_millis(idx, millis))
        .transpose()
}

fn parse_status(value: &str) -> Option<ReviewStatus> {
    match value {
        "again" => Some(ReviewStatus::Again),
        "hard" => Some(ReviewStatus::Hard),
        "good" => Some(ReviewStatus::Good),
        "easy" => Some(ReviewStatus::Easy),
        _ => None,
    }
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewableItem> {
    let strategy: String = row.get(2)?;
    let content: String = row.get(3)?;
    let last_status: Option<String> = row.get(11)?;

    Ok(ReviewableItem {
        id: row.get(0)?,
        category: row.get(1)?,
        strategy: strategy
            .parse::<StrategyKind>()
            .map_err(|e| conversion_error(2, e))?,
        content: serde_json::from_str(&content).map_err(|e| conversion_error(3, e))?,
        interval_days: row.get(4)?,
        ease_factor: row.get(5)?,
        review_count: row.get(6)?,
        next_review_date: timestamp_at(row, 7)?,
        last_reviewed_at: timestamp_at(row, 8)?,
        level: row.get(9)?,
        mastered: row.get(10)?,
        last_status: last_status.as_deref().and_then(parse_status),
        revision: row.get::<_, i64>(12)? as u64,
    })
}

fn attempt_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewAttempt> {
    let grade: String = row.get(3)?;
    let grade: Grade = serde_json::from_str(&grade).map_err(|e| conversion_error(3, e))?;
    let millis: i64 = row.get(5)?;

    Ok(ReviewAttempt {
        id: row.get(0)?,
        item_id: row.get(1)?,
        user_id: row.get(2)?,
        grade,
        category: row.get(4)?,
        timestamp: from_millis(5, millis)?,
        time_spent_ms: row.get::<_, Option<i64>>(6)?.map(|ms| ms as u64),
    })
}

impl ItemStore for SqliteStore {
    fn get_item(&self, id: &str) -> Result<ReviewableItem> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS),
            params![id],
            item_from_row,
        )
        .optional()?
        .ok_or_else(|| ReviewError::NotFound(format!("item {}", id)))
    }

    /// Returns items where next_review_date <= `before` (or unscheduled),
    /// ordered by next_review_date (oldest first, NULLs leading).
    fn list_due_items(
        &self,
        before: DateTime<Utc>,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<ReviewableItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM items
             WHERE (next_review_date IS NULL OR next_review_date <= ?1)
               AND (?2 IS NULL OR category = ?2)
             ORDER BY next_review_date ASC, id ASC
             LIMIT ?3",
            ITEM_COLUMNS
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let items = stmt
            .query_map(params![before.timestamp_millis(), category, limit], item_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn list_items(&self, category: Option<&str>) -> Result<Vec<ReviewableItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM items WHERE (?1 IS NULL OR category = ?1) ORDER BY id",
            ITEM_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![category], item_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn upsert_item(&self, item: &ReviewableItem) -> Result<()> {
        item.validate()?;
        let content = serde_json::to_string(&item.content)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let stored: Option<i64> = tx
            .query_row(
                "SELECT revision FROM items WHERE id = ?1",
                params![item.id],
                |row| row.get(0),
            )
            .optional()?;
        check_revision(item, stored.map(|r| r as u64))?;

        tx.execute(
            "INSERT OR REPLACE INTO items
             (id, category, strategy, content, interval_days, ease_factor, review_count,
              next_review_date, last_reviewed_at, level, mastered, last_status, revision)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                item.id,
                item.category,
                item.strategy.as_str(),
                content,
                item.interval_days,
                item.ease_factor,
                item.review_count,
                item.next_review_date.map(|d| d.timestamp_millis()),
                item.last_reviewed_at.map(|d| d.timestamp_millis()),
                item.level,
                item.mastered,
                item.last_status.map(|s| s.as_str()),
                item.revision as i64,
            ],
        )?;
        tx.commit()?;

        Ok(())
    }
}

impl AttemptStore for SqliteStore {
    fn append_attempt(&self, attempt: &ReviewAttempt) -> Result<()> {
        attempt.grade.validate()?;
        let grade = serde_json::to_string(&attempt.grade)?;

        self.conn()?.execute(
            "INSERT INTO attempts (id, item_id, user_id, grade, category, timestamp, time_spent_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                attempt.id,
                attempt.item_id,
                attempt.user_id,
                grade,
                attempt.category,
                attempt.timestamp.timestamp_millis(),
                attempt.time_spent_ms.map(|ms| ms as i64),
            ],
        )?;
        Ok(())
    }

    fn list_attempts(&self, user_id: &str, filter: &AttemptFilter) -> Result<Vec<ReviewAttempt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, item_id, user_id, grade, category, timestamp, time_spent_ms
             FROM attempts
             WHERE user_id = ?1
               AND (?2 IS NULL OR category = ?2)
               AND (?3 IS NULL OR item_id = ?3)
               AND (?4 IS NULL OR timestamp >= ?4)
               AND (?5 IS NULL OR timestamp < ?5)
             ORDER BY timestamp ASC, id ASC",
        )?;

        let attempts = stmt
            .query_map(
                params![
                    user_id,
                    filter.category,
                    filter.item_id,
                    filter.since.map(|d| d.timestamp_millis()),
                    filter.until.map(|d| d.timestamp_millis()),
                ],
                attempt_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(attempts)
    }
}

impl MetricsStore for SqliteStore {
    fn get_user_metrics(&self, user_id: &str) -> Result<UserMetrics> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT total_questions, correct_answers, streak, last_activity_date
                 FROM user_metrics WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((total, correct, streak, last_activity)) = row else {
            return Ok(UserMetrics::default());
        };

        let last_activity_date = last_activity
            .map(|date| {
                NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                    ReviewError::Persistence(format!("bad last_activity_date '{}': {}", date, e))
                })
            })
            .transpose()?;

        Ok(UserMetrics {
            total_questions: total as u64,
            correct_answers: correct as u64,
            streak,
            last_activity_date,
        })
    }

    fn upsert_user_metrics(&self, user_id: &str, metrics: &UserMetrics) -> Result<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO user_metrics
             (user_id, total_questions, correct_answers, streak, last_activity_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                metrics.total_questions as i64,
                metrics.correct_answers as i64,
                metrics.streak,
                metrics
                    .last_activity_date
                    .map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }
}

impl Clock for SqliteStore {
    fn now(&self) -> DateTime<Utc> {
        match self.get_current_date() {
            Ok(now) => now,
            Err(e) => {
                log::warn!("Failed to read simulated date, using wall clock: {}", e);
                Utc::now()
            }
        }
    }
}
