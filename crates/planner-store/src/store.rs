//! Composed store — the single place where backend choice happens.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};

use planner_core::config::DatabaseConfig;

use crate::error::{Result, StoreError};
use crate::memory::MemoryStore;
use crate::sqlite::SqliteStore;
use crate::types::{DatedTask, DueReminder, User, WeeklyTask};
use crate::TaskStore;

/// Probe-and-degrade facade over the two backends.
///
/// The SQLite path is probed exactly once, at construction. Afterwards:
///
/// - writes that fail against the durable backend are re-applied to the
///   fallback store, so a caller mid-flow never sees a hard failure
///   (validation errors still surface — those are the caller's fault);
/// - reads that fail return an empty result instead of an error.
///
/// Both degradations are logged at `warn`. While degraded, reminders stop
/// (the fallback's due-query is empty by design) but task bookkeeping
/// continues.
pub struct Store {
    primary: Option<SqliteStore>,
    fallback: MemoryStore,
}

impl Store {
    /// Probe the configured SQLite path and build the facade. Never fails:
    /// an unreachable backend yields a fallback-only store.
    pub fn open(cfg: &DatabaseConfig) -> Self {
        if let Some(parent) = std::path::Path::new(&cfg.path).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match SqliteStore::open(&cfg.path) {
            Ok(primary) => {
                info!(path = %cfg.path, "using durable SQLite task store");
                Self::from_parts(Some(primary), MemoryStore::new())
            }
            Err(e) => {
                warn!(
                    path = %cfg.path,
                    error = %e,
                    "durable store unavailable — falling back to in-memory store; \
                     task bookkeeping works but reminders will not be delivered"
                );
                Self::from_parts(None, MemoryStore::new())
            }
        }
    }

    /// Assemble a facade from explicit parts. Used by tests and embedders
    /// that manage the probe themselves.
    pub fn from_parts(primary: Option<SqliteStore>, fallback: MemoryStore) -> Self {
        Self { primary, fallback }
    }

    /// True when the durable backend was unreachable at startup.
    pub fn degraded(&self) -> bool {
        self.primary.is_none()
    }

    /// Run a write against the primary, degrading to the fallback on backend
    /// failure. Validation errors pass through untouched.
    fn write<T>(
        &self,
        op: &'static str,
        primary: impl Fn(&SqliteStore) -> Result<T>,
        fallback: impl Fn(&MemoryStore) -> Result<T>,
    ) -> Result<T> {
        match &self.primary {
            Some(p) => match primary(p) {
                Err(e @ (StoreError::Database(_) | StoreError::Unavailable(_))) => {
                    warn!(op, error = %e, "durable write failed — applying to fallback store");
                    fallback(&self.fallback)
                }
                other => other,
            },
            None => fallback(&self.fallback),
        }
    }

    /// Run a read against the primary, returning an empty result on backend
    /// failure (availability over completeness).
    fn read<T: Default>(
        &self,
        op: &'static str,
        primary: impl Fn(&SqliteStore) -> Result<T>,
        fallback: impl Fn(&MemoryStore) -> Result<T>,
    ) -> Result<T> {
        match &self.primary {
            Some(p) => match primary(p) {
                Err(e @ (StoreError::Database(_) | StoreError::Unavailable(_))) => {
                    warn!(op, error = %e, "durable read failed — returning empty result");
                    Ok(T::default())
                }
                other => other,
            },
            None => fallback(&self.fallback),
        }
    }
}

impl TaskStore for Store {
    fn create_user(&self, id: i64, name: &str) -> Result<()> {
        self.write(
            "create_user",
            |p| p.create_user(id, name),
            |f| f.create_user(id, name),
        )
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.read("get_user", |p| p.get_user(id), |f| f.get_user(id))
    }

    fn create_dated_task(
        &self,
        owner: i64,
        text: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<i64> {
        self.write(
            "create_dated_task",
            |p| p.create_dated_task(owner, text, date, time),
            |f| f.create_dated_task(owner, text, date, time),
        )
    }

    fn list_dated_tasks(&self, owner: i64, date: Option<NaiveDate>) -> Result<Vec<DatedTask>> {
        self.read(
            "list_dated_tasks",
            |p| p.list_dated_tasks(owner, date),
            |f| f.list_dated_tasks(owner, date),
        )
    }

    fn delete_dated_task(&self, id: i64, owner: i64) -> Result<()> {
        self.write(
            "delete_dated_task",
            |p| p.delete_dated_task(id, owner),
            |f| f.delete_dated_task(id, owner),
        )
    }

    fn due_dated_tasks(
        &self,
        since: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<DueReminder>> {
        self.read(
            "due_dated_tasks",
            |p| p.due_dated_tasks(since, until),
            |f| f.due_dated_tasks(since, until),
        )
    }

    fn mark_reminded(&self, ids: &[i64]) -> Result<()> {
        self.write(
            "mark_reminded",
            |p| p.mark_reminded(ids),
            |f| f.mark_reminded(ids),
        )
    }

    fn create_weekly_task(&self, owner: i64, text: &str, week_start: NaiveDate) -> Result<i64> {
        self.write(
            "create_weekly_task",
            |p| p.create_weekly_task(owner, text, week_start),
            |f| f.create_weekly_task(owner, text, week_start),
        )
    }

    fn list_weekly_tasks(&self, owner: i64, week_start: NaiveDate) -> Result<Vec<WeeklyTask>> {
        self.read(
            "list_weekly_tasks",
            |p| p.list_weekly_tasks(owner, week_start),
            |f| f.list_weekly_tasks(owner, week_start),
        )
    }

    fn complete_weekly_task(&self, id: i64, owner: i64) -> Result<()> {
        self.write(
            "complete_weekly_task",
            |p| p.complete_weekly_task(id, owner),
            |f| f.complete_weekly_task(id, owner),
        )
    }

    fn rollover_incomplete(&self, from: NaiveDate, to: NaiveDate) -> Result<usize> {
        self.write(
            "rollover_incomplete",
            |p| p.rollover_incomplete(from, to),
            |f| f.rollover_incomplete(from, to),
        )
    }

    fn users_with_open_weekly_tasks(&self) -> Result<Vec<i64>> {
        self.read(
            "users_with_open_weekly_tasks",
            |p| p.users_with_open_weekly_tasks(),
            |f| f.users_with_open_weekly_tasks(),
        )
    }
}
