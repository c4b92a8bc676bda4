use thiserror::Error;

/// Errors that can occur within the store subsystem.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad input to a write — the caller's fault, surfaced immediately.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The durable backend could not be reached at all.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
