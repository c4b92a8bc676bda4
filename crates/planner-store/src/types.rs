use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Result, StoreError};

/// Shared write-side validation: task text must contain something visible.
pub(crate) fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(StoreError::Validation("task text must not be empty".into()));
    }
    Ok(())
}

/// A known recipient. Created on first interaction, never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable external identity (chat id).
    pub id: i64,
    /// Display name used when rendering notifications.
    pub name: String,
}

/// A task due at a specific date and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedTask {
    /// Monotonically assigned primary key.
    pub id: i64,
    pub owner: i64,
    pub text: String,
    pub date: NaiveDate,
    /// Minute resolution; seconds are always zero.
    pub time: NaiveTime,
    pub created_at: NaiveDateTime,
    /// Terminal flag — set once after the first reminder dispatch attempt,
    /// never cleared.
    pub reminded: bool,
}

/// A task pinned to a calendar week rather than a clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyTask {
    pub id: i64,
    pub owner: i64,
    pub text: String,
    /// Always the Monday of its week.
    pub week_start: NaiveDate,
    /// Monotonic: false → true, never reversed by the system.
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

/// A due-query hit: the task plus the owner's name for message rendering.
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub task: DatedTask,
    pub owner_name: String,
}
