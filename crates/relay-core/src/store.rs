//! Subscription store trait.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{ConversationId, Selector};

/// Storage for registrations: `(conversation, selector)` pairs.
///
/// A conversation may also hold a selector-less "registered" marker, written
/// by [`register`](Self::register) on first contact. Adding a real selector
/// supersedes that marker. Every method is a single atomic operation, so
/// implementations can be shared between the routing engine (readers) and
/// the command interpreter (writers).
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Whether the conversation has any row, including the marker.
    async fn is_registered(&self, conversation: ConversationId) -> Result<bool, StoreError>;

    /// Record the conversation as known. No-op if it already has any row.
    async fn register(&self, conversation: ConversationId) -> Result<(), StoreError>;

    /// Route `selector` to `conversation`. Adding an existing pair is a no-op.
    async fn add_selector(
        &self,
        conversation: ConversationId,
        selector: &Selector,
    ) -> Result<(), StoreError>;

    /// Stop routing `selector` to `conversation`. Removing a missing pair is a no-op.
    /// The conversation stays registered after its last selector is removed.
    async fn remove_selector(
        &self,
        conversation: ConversationId,
        selector: &Selector,
    ) -> Result<(), StoreError>;

    /// All conversations holding `selector`.
    async fn matching_conversations(
        &self,
        selector: &Selector,
    ) -> Result<BTreeSet<ConversationId>, StoreError>;

    /// Every stored selector, across all conversations.
    async fn all_selectors(&self) -> Result<BTreeSet<Selector>, StoreError>;

    /// Every registered conversation.
    async fn conversations(&self) -> Result<BTreeSet<ConversationId>, StoreError>;

    /// Name of the backend, for logging.
    fn name(&self) -> &str;
}
