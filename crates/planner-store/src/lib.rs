//! `planner-store` — persistence for dated tasks, weekly tasks and users.
//!
//! # Overview
//!
//! Two backends implement the same [`TaskStore`] contract:
//!
//! | Backend                  | Role                                         |
//! |--------------------------|----------------------------------------------|
//! | [`sqlite::SqliteStore`]  | Durable SQLite store — the normal case       |
//! | [`memory::MemoryStore`]  | In-process fallback — bookkeeping only       |
//!
//! [`store::Store`] is the composition point: it probes the SQLite path once
//! at startup and degrades per-operation afterwards, so callers never branch
//! on the backend themselves. In fallback mode task bookkeeping keeps
//! working but `due_dated_tasks` returns nothing — reminders silently stop.
//! That trade (availability over completeness) is deliberate and surfaced in
//! the logs, not hidden.

pub mod db;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod types;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::Store;
pub use types::{DatedTask, DueReminder, User, WeeklyTask};

/// The persistence contract shared by both backends and the composed facade.
///
/// Every operation is safe to race with concurrent reads: mutations target a
/// single row by id, and an absent row is never an error (last write wins).
pub trait TaskStore: Send + Sync {
    /// Register a user. No-op if the id is already known.
    fn create_user(&self, id: i64, name: &str) -> Result<()>;

    /// Look up a user record by id.
    fn get_user(&self, id: i64) -> Result<Option<User>>;

    /// Create a dated task. Rejects empty/blank text with
    /// [`StoreError::Validation`]; otherwise returns the fresh task id.
    fn create_dated_task(
        &self,
        owner: i64,
        text: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<i64>;

    /// All of an owner's dated tasks ordered by (date, time), or only the
    /// tasks of one `date` ordered by time.
    fn list_dated_tasks(&self, owner: i64, date: Option<NaiveDate>) -> Result<Vec<DatedTask>>;

    /// Delete a task owned by `owner`. No-op when no row matches both.
    fn delete_dated_task(&self, id: i64, owner: i64) -> Result<()>;

    /// Unreminded tasks due in the half-open window `(since, until]` at
    /// minute resolution, each paired with the owner's display name.
    ///
    /// The range (rather than an exact-minute match) is what makes a delayed
    /// tick catch up instead of silently skipping a minute; the lower bound
    /// keeps long-past tasks from ever being re-notified.
    fn due_dated_tasks(
        &self,
        since: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<DueReminder>>;

    /// Set `reminded = true` for the given ids. No-op on an empty slice and
    /// safe to call with ids that were deleted or already marked.
    fn mark_reminded(&self, ids: &[i64]) -> Result<()>;

    /// Create a weekly task. `week_start` is normalised to its Monday.
    fn create_weekly_task(&self, owner: i64, text: &str, week_start: NaiveDate) -> Result<i64>;

    /// An owner's weekly tasks for one week, in creation order.
    fn list_weekly_tasks(&self, owner: i64, week_start: NaiveDate) -> Result<Vec<WeeklyTask>>;

    /// Idempotent set of `completed = true` for a task owned by `owner`.
    fn complete_weekly_task(&self, id: i64, owner: i64) -> Result<()>;

    /// Move every incomplete weekly task from `from` to `to` in one
    /// statement, leaving `completed` untouched. Returns the moved count.
    fn rollover_incomplete(&self, from: NaiveDate, to: NaiveDate) -> Result<usize>;

    /// Distinct owners with at least one incomplete weekly task, any week.
    fn users_with_open_weekly_tasks(&self) -> Result<Vec<i64>>;
}
