//! Error types for relay operations.

use relay_core::TransportError;
use thiserror::Error;

/// Errors that can occur while resolving display names for an event.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The source platform lookup failed.
    #[error("lookup failed: {0}")]
    Transport(#[from] TransportError),

    /// The channel belongs to no guild, so there is nothing to render.
    #[error("channel {channel_id} has no guild")]
    NoGuild { channel_id: String },
}
