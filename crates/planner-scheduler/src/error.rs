use thiserror::Error;

/// Errors that can occur within a scheduler tick.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Task store failure that the store facade could not absorb.
    #[error("Store error: {0}")]
    Store(#[from] planner_store::StoreError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
