use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid clock time: {0}")]
    InvalidClockTime(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
