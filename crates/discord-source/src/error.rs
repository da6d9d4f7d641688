//! Error types for discord-source.

use relay_core::TransportError;
use thiserror::Error;

/// Errors that can occur when talking to Discord.
#[derive(Debug, Error)]
pub enum DiscordError {
    /// Serenity client or HTTP error.
    #[error("Discord error: {0}")]
    Serenity(#[from] serenity::Error),
}

impl From<DiscordError> for TransportError {
    fn from(err: DiscordError) -> Self {
        TransportError::Request(err.to_string())
    }
}
