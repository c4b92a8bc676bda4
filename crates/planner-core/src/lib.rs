//! `planner-core` — shared types for the planner workspace.
//!
//! Holds everything the store and scheduler crates agree on: configuration
//! loading, the error taxonomy, week/minute time helpers, and the
//! [`notify::Notifier`] contract that delivery channels implement.

pub mod config;
pub mod error;
pub mod notify;
pub mod time;

pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use notify::{Notifier, NotifyError};
