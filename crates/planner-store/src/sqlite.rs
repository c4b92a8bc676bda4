//! Durable SQLite backend.

use std::sync::Mutex;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;

use planner_core::time::week_start;

use crate::db::init_db;
use crate::error::{Result, StoreError};
use crate::types::{validate_text, DatedTask, DueReminder, User, WeeklyTask};
use crate::TaskStore;

pub(crate) const DATE_FMT: &str = "%Y-%m-%d";
pub(crate) const TIME_FMT: &str = "%H:%M";
pub(crate) const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
/// Minute-resolution timestamp used for due-window comparison.
const DUE_FMT: &str = "%Y-%m-%d %H:%M";

/// Thread-safe durable store.
///
/// Wraps a single SQLite connection in a `Mutex` — sufficient for one
/// scheduler loop plus the conversation layer on a single node. Every
/// operation is one statement, so a mutation can never be observed
/// half-applied.
pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run schema init.
    pub fn open(path: &str) -> Result<Self> {
        let conn =
            Connection::open(path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Private in-memory database — used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }
}

impl TaskStore for SqliteStore {
    fn create_user(&self, id: i64, name: &str) -> Result<()> {
        let now = Local::now().naive_local().format(DATETIME_FMT).to_string();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR IGNORE INTO users (id, name, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, name, now],
        )?;
        Ok(())
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT id, name FROM users WHERE id = ?1",
            [id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        ) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    fn create_dated_task(
        &self,
        owner: i64,
        text: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<i64> {
        validate_text(text)?;
        let now = Local::now().naive_local().format(DATETIME_FMT).to_string();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO dated_tasks (owner, text, due_date, due_time, created_at, reminded)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            rusqlite::params![
                owner,
                text.trim(),
                date.format(DATE_FMT).to_string(),
                time.format(TIME_FMT).to_string(),
                now
            ],
        )?;
        Ok(db.last_insert_rowid())
    }

    fn list_dated_tasks(&self, owner: i64, date: Option<NaiveDate>) -> Result<Vec<DatedTask>> {
        let db = self.db.lock().unwrap();
        let mut out = Vec::new();
        match date {
            Some(date) => {
                let mut stmt = db.prepare(
                    "SELECT id, owner, text, due_date, due_time, created_at, reminded
                     FROM dated_tasks
                     WHERE owner = ?1 AND due_date = ?2
                     ORDER BY due_time, id",
                )?;
                let rows = stmt.query_map(
                    rusqlite::params![owner, date.format(DATE_FMT).to_string()],
                    row_to_dated_task,
                )?;
                for row in rows {
                    out.push(row?);
                }
            }
            None => {
                let mut stmt = db.prepare(
                    "SELECT id, owner, text, due_date, due_time, created_at, reminded
                     FROM dated_tasks
                     WHERE owner = ?1
                     ORDER BY due_date, due_time, id",
                )?;
                let rows = stmt.query_map(rusqlite::params![owner], row_to_dated_task)?;
                for row in rows {
                    out.push(row?);
                }
            }
        }
        Ok(out)
    }

    fn delete_dated_task(&self, id: i64, owner: i64) -> Result<()> {
        let db = self.db.lock().unwrap();
        // Zero rows affected is fine: the task may already be gone.
        db.execute(
            "DELETE FROM dated_tasks WHERE id = ?1 AND owner = ?2",
            rusqlite::params![id, owner],
        )?;
        Ok(())
    }

    fn due_dated_tasks(
        &self,
        since: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<DueReminder>> {
        let since = since.format(DUE_FMT).to_string();
        let until = until.format(DUE_FMT).to_string();
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare_cached(
            "SELECT t.id, t.owner, t.text, t.due_date, t.due_time, t.created_at, t.reminded,
                    u.name
             FROM dated_tasks t
             JOIN users u ON u.id = t.owner
             WHERE t.reminded = 0
               AND t.due_date || ' ' || t.due_time >  ?1
               AND t.due_date || ' ' || t.due_time <= ?2
             ORDER BY t.due_date, t.due_time, t.id",
        )?;
        let rows = stmt.query_map(rusqlite::params![since, until], |row| {
            Ok(DueReminder {
                task: row_to_dated_task(row)?,
                owner_name: row.get(7)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn mark_reminded(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!("UPDATE dated_tasks SET reminded = 1 WHERE id IN ({placeholders})");
        let db = self.db.lock().unwrap();
        // Ids that were deleted in the meantime simply match nothing.
        db.execute(&sql, rusqlite::params_from_iter(ids.iter()))?;
        Ok(())
    }

    fn create_weekly_task(&self, owner: i64, text: &str, week: NaiveDate) -> Result<i64> {
        validate_text(text)?;
        let week = week_start(week);
        let now = Local::now().naive_local().format(DATETIME_FMT).to_string();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO weekly_tasks (owner, text, week_start, completed, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            rusqlite::params![owner, text.trim(), week.format(DATE_FMT).to_string(), now],
        )?;
        Ok(db.last_insert_rowid())
    }

    fn list_weekly_tasks(&self, owner: i64, week: NaiveDate) -> Result<Vec<WeeklyTask>> {
        let week = week_start(week);
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, owner, text, week_start, completed, created_at
             FROM weekly_tasks
             WHERE owner = ?1 AND week_start = ?2
             ORDER BY id",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![owner, week.format(DATE_FMT).to_string()],
            row_to_weekly_task,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn complete_weekly_task(&self, id: i64, owner: i64) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "UPDATE weekly_tasks SET completed = 1 WHERE id = ?1 AND owner = ?2",
            rusqlite::params![id, owner],
        )?;
        Ok(())
    }

    fn rollover_incomplete(&self, from: NaiveDate, to: NaiveDate) -> Result<usize> {
        let db = self.db.lock().unwrap();
        let moved = db.execute(
            "UPDATE weekly_tasks SET week_start = ?2 WHERE week_start = ?1 AND completed = 0",
            rusqlite::params![
                from.format(DATE_FMT).to_string(),
                to.format(DATE_FMT).to_string()
            ],
        )?;
        Ok(moved)
    }

    fn users_with_open_weekly_tasks(&self) -> Result<Vec<i64>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT DISTINCT owner FROM weekly_tasks WHERE completed = 0 ORDER BY owner",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Map a SELECT row (columns: id, owner, text, due_date, due_time,
/// created_at, reminded) to a `DatedTask`.
fn row_to_dated_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<DatedTask> {
    Ok(DatedTask {
        id: row.get(0)?,
        owner: row.get(1)?,
        text: row.get(2)?,
        date: parse_text(row, 3, DATE_FMT, NaiveDate::parse_from_str)?,
        time: parse_text(row, 4, TIME_FMT, NaiveTime::parse_from_str)?,
        created_at: parse_text(row, 5, DATETIME_FMT, NaiveDateTime::parse_from_str)?,
        reminded: row.get::<_, i64>(6)? != 0,
    })
}

fn row_to_weekly_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<WeeklyTask> {
    Ok(WeeklyTask {
        id: row.get(0)?,
        owner: row.get(1)?,
        text: row.get(2)?,
        week_start: parse_text(row, 3, DATE_FMT, NaiveDate::parse_from_str)?,
        completed: row.get::<_, i64>(4)? != 0,
        created_at: parse_text(row, 5, DATETIME_FMT, NaiveDateTime::parse_from_str)?,
    })
}

fn parse_text<T>(
    row: &rusqlite::Row<'_>,
    idx: usize,
    fmt: &str,
    parse: impl Fn(&str, &str) -> chrono::ParseResult<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw, fmt).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
