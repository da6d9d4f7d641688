//! Error types for telegram-destination.

use thiserror::Error;

/// Errors that can occur when talking to Telegram.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot API request failed.
    #[error("Telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Another process is polling with the same token.
    #[error("another bot instance is already polling with this token")]
    Conflict,
}
