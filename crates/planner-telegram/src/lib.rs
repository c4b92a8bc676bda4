//! Telegram delivery channel for the planner.
//!
//! Implements the core [`planner_core::Notifier`] contract over a teloxide
//! `Bot`: one plain-text message per `send`, split into chunks only when a
//! digest outgrows Telegram's message limit. Long polling, no public URL.

pub mod notifier;
pub mod send;

pub use notifier::TelegramNotifier;
