//! Routing engine: which chats receive a source event.

use std::collections::BTreeSet;
use std::sync::Arc;

use relay_core::{ConversationId, SourceEvent, SourcePlatform, StoreError, SubscriptionStore};
use tracing::{debug, error, warn};

use crate::allowlist::AllowList;
use crate::policy::{AllowListScope, RoutingPolicy, ThreadGate};

/// Computes the destination chats for each source event.
///
/// The result is a sorted set: a chat appears at most once per event no
/// matter how many of its selectors match, and two chats holding the same
/// selector each appear. For a fixed store and platform state the same event
/// always routes the same way.
pub struct RoutingEngine {
    policy: RoutingPolicy,
    store: Arc<dyn SubscriptionStore>,
    source: Arc<dyn SourcePlatform>,
    allow_list: AllowList,
}

impl RoutingEngine {
    /// Create an engine for one policy.
    ///
    /// `allow_list` is only consulted by the shared allow-list policy.
    pub fn new(
        policy: RoutingPolicy,
        store: Arc<dyn SubscriptionStore>,
        source: Arc<dyn SourcePlatform>,
        allow_list: AllowList,
    ) -> Self {
        Self {
            policy,
            store,
            source,
            allow_list,
        }
    }

    /// The active policy.
    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    /// Chats that must receive `event`. Empty when nothing matches.
    ///
    /// Store failures are logged and treated as no match.
    pub async fn route(&self, event: &SourceEvent) -> BTreeSet<ConversationId> {
        match self.try_route(event).await {
            Ok(targets) => {
                debug!(
                    channel_id = %event.channel_id,
                    policy = self.policy.as_str(),
                    targets = targets.len(),
                    "Routed event"
                );
                targets
            }
            Err(e) => {
                error!(
                    channel_id = %event.channel_id,
                    store = self.store.name(),
                    "Store lookup failed, dropping event: {}",
                    e
                );
                BTreeSet::new()
            }
        }
    }

    async fn try_route(&self, event: &SourceEvent) -> Result<BTreeSet<ConversationId>, StoreError> {
        match &self.policy {
            RoutingPolicy::Broadcast => self.store.conversations().await,

            RoutingPolicy::ChannelAllowList {
                scope: AllowListScope::Shared,
            } => {
                if self.allow_list.contains(&event.channel_id).await {
                    self.store.conversations().await
                } else {
                    Ok(BTreeSet::new())
                }
            }

            RoutingPolicy::ChannelAllowList {
                scope: AllowListScope::PerConversation,
            } => {
                self.store
                    .matching_conversations(&event.channel_selector())
                    .await
            }

            RoutingPolicy::GuildForwarding(gate) => {
                let Some(guild) = event.guild_selector() else {
                    return Ok(BTreeSet::new());
                };

                let targets = self.store.matching_conversations(&guild).await?;
                if targets.is_empty() || !self.passes_gate(gate, event).await {
                    return Ok(BTreeSet::new());
                }
                Ok(targets)
            }

            RoutingPolicy::SingleChannel => {
                let targets = self
                    .store
                    .matching_conversations(&event.channel_selector())
                    .await?;
                if targets.len() > 1 {
                    warn!(
                        channel_id = %event.channel_id,
                        chats = targets.len(),
                        "Channel registered by several chats, delivering to the first"
                    );
                }
                Ok(targets.into_iter().take(1).collect())
            }
        }
    }

    /// Thread gate for guild forwarding.
    async fn passes_gate(&self, gate: &ThreadGate, event: &SourceEvent) -> bool {
        if gate.join_threads {
            if let Err(e) = self.source.join_thread(&event.channel_id).await {
                debug!(channel_id = %event.channel_id, "Not a joinable thread: {}", e);
                return false;
            }
        }

        if event.content.contains(gate.marker.as_str()) {
            return true;
        }

        match self
            .source
            .list_prior_messages(&event.channel_id, &event.message_id, gate.prior_window)
            .await
        {
            Ok(prior) => prior.is_empty(),
            Err(e) => {
                warn!(
                    channel_id = %event.channel_id,
                    "Failed to fetch channel history: {}",
                    e
                );
                false
            }
        }
    }
}
