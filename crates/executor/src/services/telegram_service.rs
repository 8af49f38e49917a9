use async_trait::async_trait;
use common::error::DeliveryError;
use common::traits::AlertSink;
use teloxide::prelude::*;
use tracing::info;

use crate::config::TelegramConfig;

/// Posts alerts to a single Telegram chat.
pub struct TelegramService {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramService {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            bot: Bot::new(config.token),
            chat_id: ChatId(config.chat_id),
        }
    }
}

#[async_trait]
impl AlertSink for TelegramService {
    async fn deliver(&self, message: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(self.chat_id, message.to_string())
            .await
            .map_err(|e| DeliveryError(e.to_string()))?;

        info!("Telegram message sent to chat {}", self.chat_id.0);
        Ok(())
    }
}
