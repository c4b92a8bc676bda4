//! Notification delivery contract — the only way the scheduler reaches users.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// One-way "deliver text to user" capability.
///
/// One message per call, no batching, no confirmation beyond the call result.
/// Failures are per-recipient: the scheduler logs and moves on, so an
/// implementation must not panic on an unreachable recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: i64, text: &str) -> std::result::Result<(), NotifyError>;
}
