//! Outbound delivery.

use async_trait::async_trait;
use relay_core::{ConversationId, Destination, TransportError};
use teloxide::prelude::*;
use tracing::debug;

/// [`Destination`] that posts plain text through the Bot API.
#[derive(Clone)]
pub struct TelegramDestination {
    bot: Bot,
}

impl TelegramDestination {
    /// Wrap a connected bot.
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// The underlying bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl Destination for TelegramDestination {
    async fn send_text(
        &self,
        conversation: ConversationId,
        text: &str,
    ) -> Result<(), TransportError> {
        let message = self
            .bot
            .send_message(ChatId(conversation.get()), text)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        debug!(chat_id = conversation.get(), message_id = message.id.0, "Sent Telegram message");
        Ok(())
    }
}
