//! Weekly task lifecycle: Monday rollover and the once-daily digest.
//!
//! Both checks run inside the normal tick. Each keeps a loop-local
//! "last fired" marker so a sub-minute tick interval cannot double-fire;
//! the markers are not persisted, so a restart after the firing time will
//! run the check once more. For rollover that repeat is a no-op (the
//! matched rows were already moved); for the digest it means at most one
//! extra summary after a restart, which the design accepts.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use planner_core::time::week_start;
use planner_store::TaskStore;

use crate::engine::Engine;
use crate::error::Result;
use crate::render;

impl Engine {
    /// Run the rollover and digest checks for the tick at `now`.
    ///
    /// Rollover runs first so a Monday digest already reflects the carried
    /// tasks.
    pub async fn weekly_pass(&mut self, now: NaiveDateTime) -> Result<()> {
        let today = now.date();
        let week = week_start(today);

        let rollover_at = week.and_time(self.cfg.rollover_at.to_naive_time());
        if self.last_rollover_week != Some(week) && now >= rollover_at {
            self.rollover(week)?;
            self.last_rollover_week = Some(week);
        }

        let digest_at = today.and_time(self.cfg.digest_at.to_naive_time());
        if self.last_digest_on != Some(today) && now >= digest_at {
            self.send_digests(week).await?;
            self.last_digest_on = Some(today);
        }

        Ok(())
    }

    /// Move last week's incomplete tasks into the week starting at `week`.
    fn rollover(&self, week: NaiveDate) -> Result<()> {
        let from = week - Duration::days(7);
        let moved = self.store.rollover_incomplete(from, week)?;
        if moved > 0 {
            info!(moved, from = %from, to = %week, "weekly rollover complete");
        }
        Ok(())
    }

    /// Send every owner with open weekly tasks a summary of the current
    /// week. Per-recipient failures are logged and skipped.
    async fn send_digests(&self, week: NaiveDate) -> Result<()> {
        for owner in self.store.users_with_open_weekly_tasks()? {
            let tasks = self.store.list_weekly_tasks(owner, week)?;
            if tasks.is_empty() {
                continue;
            }
            let text = render::digest(week, &tasks);
            if let Err(e) = self.notifier.send(owner, &text).await {
                warn!(owner, error = %e, "digest delivery failed");
            } else {
                info!(owner, tasks = tasks.len(), "weekly digest delivered");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use planner_core::config::SchedulerConfig;
    use planner_store::TaskStore;

    use crate::engine::tests::{d, durable_store, engine, t, RecordingNotifier};

    #[tokio::test]
    async fn digest_fires_once_per_day() {
        let store = durable_store();
        store.create_user(1, "Alice").unwrap();
        // Current week of 2024-06-12 (a Wednesday) starts on 2024-06-10.
        store.create_weekly_task(1, "laundry", d(2024, 6, 10)).unwrap();

        let notifier = RecordingNotifier::new();
        let mut engine = engine(store.clone(), notifier.clone(), SchedulerConfig::default());
        // Rollover already handled for this week; isolate the digest check.
        engine.last_rollover_week = Some(d(2024, 6, 10));

        // Before 10:00 — nothing.
        engine.weekly_pass(d(2024, 6, 12).and_time(t(9, 59))).await.unwrap();
        assert_eq!(notifier.count(), 0);

        // First tick at/after 10:00 fires; the rest of the day stays quiet.
        engine.weekly_pass(d(2024, 6, 12).and_time(t(10, 0))).await.unwrap();
        assert_eq!(notifier.count(), 1);
        engine.weekly_pass(d(2024, 6, 12).and_time(t(10, 0))).await.unwrap();
        engine.weekly_pass(d(2024, 6, 12).and_time(t(15, 30))).await.unwrap();
        assert_eq!(notifier.count(), 1);

        // Next day fires again.
        engine.weekly_pass(d(2024, 6, 13).and_time(t(10, 1))).await.unwrap();
        assert_eq!(notifier.count(), 2);
    }

    #[tokio::test]
    async fn digest_lists_progress_and_skips_taskless_weeks() {
        let store = durable_store();
        store.create_user(1, "Alice").unwrap();
        store.create_user(2, "Bob").unwrap();
        let done = store.create_weekly_task(1, "laundry", d(2024, 6, 10)).unwrap();
        store.create_weekly_task(1, "groceries", d(2024, 6, 10)).unwrap();
        store.complete_weekly_task(done, 1).unwrap();
        // Bob only has a task for next week: open, but nothing to digest now.
        store.create_weekly_task(2, "taxes", d(2024, 6, 17)).unwrap();

        let notifier = RecordingNotifier::new();
        let mut engine = engine(store.clone(), notifier.clone(), SchedulerConfig::default());
        engine.last_rollover_week = Some(d(2024, 6, 10));

        engine.weekly_pass(d(2024, 6, 12).and_time(t(10, 0))).await.unwrap();

        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        let (recipient, text) = &sent[0];
        assert_eq!(*recipient, 1);
        assert!(text.contains("✅ laundry"));
        assert!(text.contains("📝 groceries"));
        assert!(text.contains("1/2"));
    }

    #[tokio::test]
    async fn rollover_moves_incomplete_and_fires_once_per_week() {
        let store = durable_store();
        store.create_user(1, "Alice").unwrap();
        let done = store.create_weekly_task(1, "done", d(2024, 6, 3)).unwrap();
        store.create_weekly_task(1, "pending", d(2024, 6, 3)).unwrap();
        store.complete_weekly_task(done, 1).unwrap();

        let notifier = RecordingNotifier::new();
        let mut engine = engine(
            store.clone(),
            notifier.clone(),
            SchedulerConfig::default(),
        );

        // Monday 2024-06-10, just past the 00:05 rollover time.
        engine.weekly_pass(d(2024, 6, 10).and_time(t(0, 6))).await.unwrap();

        let moved = store.list_weekly_tasks(1, d(2024, 6, 10)).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].text, "pending");
        assert!(!moved[0].completed);
        let left = store.list_weekly_tasks(1, d(2024, 6, 3)).unwrap();
        assert_eq!(left.len(), 1);
        assert!(left[0].completed);

        // Later ticks the same week do not roll again.
        engine.weekly_pass(d(2024, 6, 11).and_time(t(0, 6))).await.unwrap();
        assert_eq!(store.list_weekly_tasks(1, d(2024, 6, 10)).unwrap().len(), 1);
        assert_eq!(store.list_weekly_tasks(1, d(2024, 6, 17)).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn rollover_does_not_fire_before_its_clock_time() {
        let store = durable_store();
        store.create_user(1, "Alice").unwrap();
        store.create_weekly_task(1, "pending", d(2024, 6, 3)).unwrap();

        let notifier = RecordingNotifier::new();
        let mut engine = engine(store.clone(), notifier.clone(), SchedulerConfig::default());

        // Monday 00:04 — one minute before the configured rollover time.
        engine.weekly_pass(d(2024, 6, 10).and_time(t(0, 4))).await.unwrap();
        assert_eq!(store.list_weekly_tasks(1, d(2024, 6, 3)).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mid_week_start_still_catches_up_the_rollover() {
        let store = durable_store();
        store.create_user(1, "Alice").unwrap();
        store.create_weekly_task(1, "pending", d(2024, 6, 3)).unwrap();

        let notifier = RecordingNotifier::new();
        let mut engine = engine(store.clone(), notifier.clone(), SchedulerConfig::default());

        // Process started on Wednesday — the Monday boundary already passed.
        engine.weekly_pass(d(2024, 6, 12).and_time(t(8, 0))).await.unwrap();
        let moved = store.list_weekly_tasks(1, d(2024, 6, 10)).unwrap();
        assert_eq!(moved.len(), 1);
    }
}
