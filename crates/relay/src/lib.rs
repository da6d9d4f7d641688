//! Routing and registration engine for the Discord to Telegram relay.
//!
//! This crate decides which Telegram chats receive each Discord message and
//! lets Telegram users change that mapping with plain-text commands.
//!
//! # Architecture
//!
//! ```text
//! Discord message (SourceSignal from the gateway queue)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                           RELAY                             │
//! │                                                             │
//! │  1. RoutingEngine: policy + SubscriptionStore → chat ids    │
//! │         ↓ (stop if empty)                                   │
//! │  2. NameResolver: cached guild / channel names              │
//! │         ↓                                                   │
//! │  3. Dispatcher: "[guild/channel] content" to each chat      │
//! └─────────────────────────────────────────────────────────────┘
//!
//! Telegram message → CommandInterpreter → /add, /remove, first contact
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use relay::{
//!     AllowList, Dispatcher, NameCacheConfig, NameResolver, Relay, RoutingEngine, RoutingPolicy,
//! };
//!
//! let engine = RoutingEngine::new(RoutingPolicy::SingleChannel, store, source.clone(), AllowList::new());
//! let names = NameResolver::new(source, NameCacheConfig::default());
//! let relay = Relay::new(engine, names, Dispatcher::new(destination));
//!
//! let report = relay.handle_event(&event).await;
//! println!("delivered to {} chats", report.delivered);
//! ```

mod allowlist;
mod commands;
mod dispatcher;
mod error;
mod names;
mod pipeline;
mod policy;
mod router;

// Public exports
pub use allowlist::AllowList;
pub use commands::{
    Command, CommandInterpreter, CommandOutcome, CommandTarget, CHANNEL_REGISTERED,
    CHANNEL_UNREGISTERED, CHAT_REGISTERED,
};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::ResolveError;
pub use names::{NameCacheConfig, NameResolver, ResolvedNames};
pub use pipeline::{run_delivery_worker, Relay};
pub use policy::{
    AllowListScope, RoutingPolicy, ThreadGate, DEFAULT_BROADCAST_MARKER, DEFAULT_PRIOR_WINDOW,
};
pub use router::RoutingEngine;

// Re-export commonly used types from relay-core
pub use relay_core::{ConversationId, Selector, SourceEvent, SourceSignal};
