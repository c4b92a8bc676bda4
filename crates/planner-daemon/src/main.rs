//! `plannerd` — composition point for the reminder engine.
//!
//! Loads config, probes the store backend once, picks the notifier, starts
//! the scheduler loop and stops it cleanly on Ctrl-C. The conversation
//! layer (bot commands, menus) lives outside this process and talks to the
//! same task store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use planner_core::config::PlannerConfig;
use planner_core::notify::{Notifier, NotifyError};
use planner_scheduler::Scheduler;
use planner_store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planner=info,plannerd=info".into()),
        )
        .init();

    // load config: explicit PLANNER_CONFIG path > ~/.planner/planner.toml
    let config_path = std::env::var("PLANNER_CONFIG").ok();
    let config = PlannerConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        PlannerConfig::default()
    });

    // probe-and-choose happens exactly once, in here
    let store = Arc::new(Store::open(&config.database));

    let notifier: Arc<dyn Notifier> = match &config.telegram {
        Some(tg) => {
            info!("delivering notifications via Telegram");
            Arc::new(planner_telegram::TelegramNotifier::new(&tg.bot_token))
        }
        None => {
            warn!("no telegram.bot_token configured — notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let handle = Scheduler::new(store, notifier, config.scheduler.clone()).start();
    info!("planner daemon running; Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    handle.stop().await;
    Ok(())
}

/// Placeholder channel when no delivery credentials are configured.
struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: i64, text: &str) -> Result<(), NotifyError> {
        info!(recipient, "notification (log only):\n{text}");
        Ok(())
    }
}
