use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use planner_core::config::SchedulerConfig;
use planner_core::notify::Notifier;
use planner_core::time::truncate_to_minute;
use planner_store::{Store, TaskStore};

use crate::error::Result;
use crate::render;

/// Entry point: owns the dependencies until the loop is spawned.
///
/// `Stopped → Running → Stopped`: [`Scheduler::start`] spawns the loop and
/// returns immediately; [`SchedulerHandle::stop`] signals it and waits for
/// the task to exit.
pub struct Scheduler {
    store: Arc<Store>,
    notifier: Arc<dyn Notifier>,
    cfg: SchedulerConfig,
}

impl Scheduler {
    pub fn new(store: Arc<Store>, notifier: Arc<dyn Notifier>, cfg: SchedulerConfig) -> Self {
        Self {
            store,
            notifier,
            cfg,
        }
    }

    /// Spawn the scheduling loop on the current Tokio runtime.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let engine = Engine::new(self.store, self.notifier, self.cfg);
        let task = tokio::spawn(engine.run(shutdown_rx));
        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running scheduler loop.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop to exit and wait until it has — no orphaned work.
    ///
    /// The stop signal is observed at the next tick boundary: a tick that is
    /// already running completes (including its mark step) first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!("scheduler task join failed: {e}");
        }
    }
}

/// The tick loop itself. Owned by the spawned task; tests drive the
/// per-tick methods directly with simulated clocks.
pub struct Engine {
    pub(crate) store: Arc<Store>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) cfg: SchedulerConfig,
    /// Minute the last reminder pass ran at — lower bound of the next
    /// due window, so a delayed tick catches up instead of skipping.
    last_pass: Option<NaiveDateTime>,
    pub(crate) last_digest_on: Option<NaiveDate>,
    pub(crate) last_rollover_week: Option<NaiveDate>,
}

impl Engine {
    pub fn new(store: Arc<Store>, notifier: Arc<dyn Notifier>, cfg: SchedulerConfig) -> Self {
        Self {
            store,
            notifier,
            cfg,
            last_pass: None,
            last_digest_on: None,
            last_rollover_week: None,
        }
    }

    /// Main loop. Polls every `tick_secs` until `shutdown` flips to true.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            lead_times = ?self.cfg.lead_times_min,
            tick_secs = self.cfg.tick_secs,
            "reminder scheduler started"
        );

        let mut interval = tokio::time::interval(StdDuration::from_secs(self.cfg.tick_secs.max(1)));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = Local::now().naive_local();
                    if let Err(e) = self.tick(now).await {
                        error!("scheduler tick failed: {e}");
                        // One extended pause after a bad tick; stop is still
                        // observed while we wait.
                        tokio::select! {
                            _ = tokio::time::sleep(StdDuration::from_secs(self.cfg.backoff_secs)) => {}
                            _ = shutdown.changed() => {}
                        }
                        if *shutdown.borrow() {
                            break;
                        }
                        interval.reset();
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("reminder scheduler stopped");
    }

    /// One tick: reminder pass, then the weekly lifecycle checks.
    pub async fn tick(&mut self, now: NaiveDateTime) -> Result<()> {
        self.reminder_pass(now).await?;
        self.weekly_pass(now).await?;
        Ok(())
    }

    /// Dispatch reminders for every task whose due time crossed a horizon
    /// since the last pass, then mark the whole union reminded at once.
    pub async fn reminder_pass(&mut self, now: NaiveDateTime) -> Result<()> {
        let now = truncate_to_minute(now);
        let since = self.last_pass.unwrap_or_else(|| now - Duration::minutes(1));
        if now <= since {
            // Second tick within the same minute — nothing new can be due.
            return Ok(());
        }

        let mut dispatched: Vec<i64> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();

        for &lead_min in &self.cfg.lead_times_min {
            let lead = Duration::minutes(lead_min as i64);
            let due = self.store.due_dated_tasks(since + lead, now + lead)?;
            for item in due {
                // A task can sit in two horizon windows after a long delay;
                // the first horizon processed consumes it.
                if !seen.insert(item.task.id) {
                    continue;
                }
                let text = render::reminder(&item, lead_min);
                match self.notifier.send(item.task.owner, &text).await {
                    Ok(()) => info!(
                        task_id = item.task.id,
                        owner = item.task.owner,
                        lead_min,
                        "reminder delivered"
                    ),
                    Err(e) => warn!(
                        task_id = item.task.id,
                        owner = item.task.owner,
                        error = %e,
                        "reminder delivery failed"
                    ),
                }
                // Attempted deliveries count: a failed send is not retried.
                dispatched.push(item.task.id);
            }
        }

        self.store.mark_reminded(&dispatched)?;
        self.last_pass = Some(now);
        Ok(())
    }
}
