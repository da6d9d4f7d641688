//! Long polling for inbound chat messages.

use std::future::Future;
use std::time::Duration;

use relay_core::ConversationId;
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, Message, UpdateKind};
use teloxide::{ApiError, RequestError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::TelegramError;

/// Pause after a failed `getUpdates` call.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Text received from a Telegram chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    /// The chat the message came from.
    pub conversation: ConversationId,
    /// Message text, empty for non-text messages.
    pub text: String,
}

impl InboundText {
    /// Extract the chat and text of a message.
    pub fn from_message(msg: &Message) -> Self {
        Self {
            conversation: ConversationId::new(msg.chat.id.0),
            text: msg.text().unwrap_or_default().to_string(),
        }
    }
}

/// Poll for messages until `cancel` fires, calling `handler` for each one in
/// order.
///
/// Transient failures are logged and retried. Returns an error only when
/// another process is polling with the same token.
pub async fn run_polling<H, Fut>(
    bot: Bot,
    poll_timeout: Duration,
    cancel: CancellationToken,
    mut handler: H,
) -> Result<(), TelegramError>
where
    H: FnMut(InboundText) -> Fut + Send,
    Fut: Future<Output = ()> + Send,
{
    info!("Starting Telegram polling loop");
    let timeout = u32::try_from(poll_timeout.as_secs()).unwrap_or(u32::MAX);
    let mut offset: i32 = 0;

    loop {
        let poll = async {
            bot.get_updates()
                .offset(offset)
                .timeout(timeout)
                .allowed_updates(vec![AllowedUpdate::Message])
                .await
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = poll => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "Got Telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    match update.kind {
                        UpdateKind::Message(msg) => handler(InboundText::from_message(&msg)).await,
                        other => debug!("Ignoring non-message update: {:?}", other),
                    }
                }
            }
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                warn!("Another instance is polling with this token, stopping");
                return Err(TelegramError::Conflict);
            }
            Err(e) => {
                warn!(error = %e, "Telegram getUpdates failed");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
        }
    }

    info!("Telegram polling stopped");
    Ok(())
}
