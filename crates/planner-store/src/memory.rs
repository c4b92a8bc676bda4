//! In-process fallback backend.
//!
//! Mirrors the SQLite contract for bookkeeping, with one deliberate
//! exception: [`TaskStore::due_dated_tasks`] always returns nothing. The
//! fallback exists so task CRUD keeps working while the durable backend is
//! down; it never drives reminder delivery, because anything reminded from a
//! non-durable store would be lost (and possibly re-sent) on restart.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use planner_core::time::{truncate_time_to_minute, week_start};

use crate::error::Result;
use crate::types::{validate_text, DatedTask, DueReminder, User, WeeklyTask};
use crate::TaskStore;

#[derive(Default)]
struct Inner {
    users: HashMap<i64, String>,
    dated: Vec<DatedTask>,
    weekly: Vec<WeeklyTask>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Non-durable task store with the same semantics as [`crate::SqliteStore`]
/// except for reminder delivery (see module docs).
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for MemoryStore {
    fn create_user(&self, id: i64, name: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.users.entry(id).or_insert_with(|| name.to_string());
        Ok(())
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&id).map(|name| User {
            id,
            name: name.clone(),
        }))
    }

    fn create_dated_task(
        &self,
        owner: i64,
        text: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<i64> {
        validate_text(text)?;
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.dated.push(DatedTask {
            id,
            owner,
            text: text.trim().to_string(),
            date,
            time: truncate_time_to_minute(time),
            created_at: Local::now().naive_local(),
            reminded: false,
        });
        Ok(id)
    }

    fn list_dated_tasks(&self, owner: i64, date: Option<NaiveDate>) -> Result<Vec<DatedTask>> {
        let inner = self.inner.lock().unwrap();
        let mut tasks: Vec<DatedTask> = inner
            .dated
            .iter()
            .filter(|t| t.owner == owner && date.map_or(true, |d| t.date == d))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.date, t.time, t.id));
        Ok(tasks)
    }

    fn delete_dated_task(&self, id: i64, owner: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.dated.retain(|t| !(t.id == id && t.owner == owner));
        Ok(())
    }

    fn due_dated_tasks(
        &self,
        _since: NaiveDateTime,
        _until: NaiveDateTime,
    ) -> Result<Vec<DueReminder>> {
        // Degraded mode: the fallback never feeds the reminder loop.
        Ok(Vec::new())
    }

    fn mark_reminded(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut inner = self.inner.lock().unwrap();
        for task in inner.dated.iter_mut() {
            if ids.contains(&task.id) {
                task.reminded = true;
            }
        }
        Ok(())
    }

    fn create_weekly_task(&self, owner: i64, text: &str, week: NaiveDate) -> Result<i64> {
        validate_text(text)?;
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.weekly.push(WeeklyTask {
            id,
            owner,
            text: text.trim().to_string(),
            week_start: week_start(week),
            completed: false,
            created_at: Local::now().naive_local(),
        });
        Ok(id)
    }

    fn list_weekly_tasks(&self, owner: i64, week: NaiveDate) -> Result<Vec<WeeklyTask>> {
        let week = week_start(week);
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .weekly
            .iter()
            .filter(|t| t.owner == owner && t.week_start == week)
            .cloned()
            .collect())
    }

    fn complete_weekly_task(&self, id: i64, owner: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(task) = inner
            .weekly
            .iter_mut()
            .find(|t| t.id == id && t.owner == owner)
        {
            task.completed = true;
        }
        Ok(())
    }

    fn rollover_incomplete(&self, from: NaiveDate, to: NaiveDate) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        let mut moved = 0;
        for task in inner.weekly.iter_mut() {
            if task.week_start == from && !task.completed {
                task.week_start = to;
                moved += 1;
            }
        }
        Ok(moved)
    }

    fn users_with_open_weekly_tasks(&self) -> Result<Vec<i64>> {
        let inner = self.inner.lock().unwrap();
        let mut owners: Vec<i64> = inner
            .weekly
            .iter()
            .filter(|t| !t.completed)
            .map(|t| t.owner)
            .collect();
        owners.sort_unstable();
        owners.dedup();
        Ok(owners)
    }
}
