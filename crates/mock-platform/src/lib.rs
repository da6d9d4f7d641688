//! Mock platform implementations for relay testing.
//!
//! This crate provides in-memory stand-ins for both ends of the relay:
//! - `MockSource` - A scripted [`SourcePlatform`] with call counters
//! - `RecordingDestination` - A [`Destination`] that records every send
//!
//! # Example
//!
//! ```rust
//! use mock_platform::{MockSource, RecordingDestination};
//! use relay_core::{ConversationId, Destination};
//!
//! # async fn example() -> Result<(), relay_core::TransportError> {
//! let source = MockSource::new()
//!     .with_guild("g1", "Rustaceans")
//!     .with_channel("12345", "general", "g1");
//!
//! let destination = RecordingDestination::new();
//! destination.send_text(ConversationId::new(999), "hello").await?;
//! assert_eq!(destination.sent_to(ConversationId::new(999)), vec!["hello"]);
//! # Ok(())
//! # }
//! ```

mod destination;
mod source;

pub use destination::RecordingDestination;
pub use source::MockSource;

// Re-export relay-core traits for convenience
pub use relay_core::{Destination, SourcePlatform};
