//! Telegram side of the relay.
//!
//! This crate provides:
//!
//! - [`connect`] - Verify the bot token and clear any webhook
//! - [`TelegramDestination`] - A [`Destination`](relay_core::Destination)
//!   that sends plain text with the Bot API
//! - [`run_polling`] - A long-polling loop handing inbound chat text to a
//!   callback
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use telegram_destination::{connect, run_polling, TelegramDestination};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), telegram_destination::TelegramError> {
//! let bot = connect("123:abc", Duration::from_secs(60)).await?;
//! let destination = TelegramDestination::new(bot.clone());
//!
//! run_polling(bot, Duration::from_secs(60), CancellationToken::new(), |inbound| async move {
//!     println!("{}: {}", inbound.conversation, inbound.text);
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

mod destination;
mod error;
mod polling;

pub use destination::TelegramDestination;
pub use error::TelegramError;
pub use polling::{run_polling, InboundText};

use std::time::Duration;

use teloxide::prelude::*;
use tracing::info;

/// Slack between the long-poll timeout and the HTTP client timeout, so the
/// client does not abort a poll before Telegram answers.
const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(15);

/// Build a bot, verify its token and delete any webhook so long polling
/// works.
pub async fn connect(token: &str, poll_timeout: Duration) -> Result<Bot, TelegramError> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(poll_timeout + CLIENT_TIMEOUT_SLACK)
        .build()
        .map_err(|e| TelegramError::Client(e.to_string()))?;
    let bot = Bot::with_client(token, client);

    let me = bot.get_me().await?;
    bot.delete_webhook().await?;

    info!(username = ?me.username, "Telegram bot connected (webhook cleared)");
    Ok(bot)
}
