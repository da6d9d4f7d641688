//! Core types and traits for the Discord to Telegram relay.
//!
//! This crate provides the shared interface between the routing engine and
//! the platforms it talks to. It defines:
//!
//! - [`SubscriptionStore`] - Registration storage (which source selectors feed
//!   which destination conversation)
//! - [`SourcePlatform`] - Lookups against the source platform (Discord)
//! - [`Destination`] - Delivery to the destination platform (Telegram)
//! - [`SourceEvent`] / [`RelayMessage`] - Message types flowing through the relay
//! - [`MemoryStore`] - An in-process [`SubscriptionStore`]
//!
//! # Example
//!
//! ```rust
//! use relay_core::{ConversationId, MemoryStore, Selector, SubscriptionStore};
//!
//! # async fn example() -> Result<(), relay_core::StoreError> {
//! let store = MemoryStore::new();
//! let chat = ConversationId::new(999);
//!
//! store.add_selector(chat, &Selector::new("12345")).await?;
//! assert!(store.is_registered(chat).await?);
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod platform;
mod store;
mod types;

pub use error::{StoreError, TransportError};
pub use memory::MemoryStore;
pub use platform::{Destination, SourcePlatform};
pub use store::SubscriptionStore;
pub use types::{
    ChannelInfo, ConversationId, GuildInfo, PriorMessage, RelayMessage, Selector, SourceEvent,
    SourceSignal,
};

// Re-export async_trait for implementors
pub use async_trait::async_trait;
