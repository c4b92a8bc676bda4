//! `planner-scheduler` — the background loop that turns stored tasks into
//! notifications.
//!
//! # Overview
//!
//! One Tokio task polls the store on a fixed interval. Each tick runs to
//! completion before the next begins, and performs three phases in order:
//!
//! | Phase           | Behaviour                                            |
//! |-----------------|------------------------------------------------------|
//! | Reminder pass   | Per lead time, query the due window since the last   |
//! |                 | pass, dispatch once per task, mark the union         |
//! | Weekly rollover | First tick at/after the Monday rollover time moves   |
//! |                 | last week's incomplete tasks into the current week   |
//! | Daily digest    | First tick at/after the digest time sends each owner |
//! |                 | their open-week task summary                         |
//!
//! The loop holds no task state between ticks — every tick re-reads the
//! store, so a restart is harmless. A failed tick is logged and followed by
//! one extended backoff; nothing inside a tick can terminate the loop.

pub mod engine;
pub mod error;
pub mod render;
mod weekly;

pub use engine::{Engine, Scheduler, SchedulerHandle};
pub use error::{Result, SchedulerError};
