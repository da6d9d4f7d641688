//! Error types shared across the relay.

use thiserror::Error;

/// Errors raised by a [`SubscriptionStore`](crate::SubscriptionStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed (I/O, corruption, pool exhaustion).
    #[error("store backend error: {0}")]
    Backend(String),

    /// The backend has been closed.
    #[error("store closed")]
    Closed,
}

/// Errors raised by platform calls on either side of the relay.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The platform API request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The platform does not know the requested object.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// An identifier could not be parsed for the platform.
    #[error("invalid {kind} id: {id:?}")]
    InvalidId { kind: &'static str, id: String },

    /// Message delivery was rejected.
    #[error("send failed: {0}")]
    SendFailed(String),
}
