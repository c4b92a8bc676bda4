use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;

use planner_core::notify::{Notifier, NotifyError};

use crate::send::split_chunks;

/// Delivers planner notifications to Telegram chats.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str) -> Self {
        Self {
            bot: Bot::new(bot_token),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, recipient: i64, text: &str) -> Result<(), NotifyError> {
        let chunks = split_chunks(text);
        let last = chunks.len() - 1;
        for (i, chunk) in chunks.iter().enumerate() {
            self.bot
                .send_message(ChatId(recipient), chunk)
                .await
                .map_err(|e| NotifyError::Delivery(e.to_string()))?;
            // Small gap between chunks to stay under Telegram rate limits.
            if i < last {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
        Ok(())
    }
}
