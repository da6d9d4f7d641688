//! Discord side of the relay.
//!
//! This crate provides:
//!
//! - [`DiscordHandler`] - A serenity event handler that turns gateway events
//!   into [`SourceSignal`](relay_core::SourceSignal)s on a bounded queue
//! - [`DiscordPlatform`] - A [`SourcePlatform`](relay_core::SourcePlatform)
//!   backed by the Discord REST API
//!
//! # Example
//!
//! ```no_run
//! use discord_source::{build_client, DiscordHandler, DiscordPlatform};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), discord_source::DiscordError> {
//! let (queue, mut signals) = mpsc::channel(256);
//! let mut client = build_client("token", DiscordHandler::new(queue)).await?;
//! let platform = DiscordPlatform::new(client.http.clone());
//!
//! tokio::spawn(async move { client.start().await });
//! while let Some(signal) = signals.recv().await {
//!     println!("{:?}", signal);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod handler;
mod platform;

pub use error::DiscordError;
pub use handler::{to_source_event, DiscordHandler};
pub use platform::DiscordPlatform;

use serenity::Client;
use tracing::info;

/// Build a gateway client with the relay's handler and intents.
///
/// The client is not connected until [`Client::start`] is called.
pub async fn build_client(token: &str, handler: DiscordHandler) -> Result<Client, DiscordError> {
    let client = Client::builder(token, DiscordHandler::intents())
        .event_handler(handler)
        .await?;
    info!("Discord client built");
    Ok(client)
}
