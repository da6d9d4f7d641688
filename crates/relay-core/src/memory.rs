//! In-process subscription store.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::store::SubscriptionStore;
use crate::types::{ConversationId, Selector};

/// A [`SubscriptionStore`] kept in memory.
///
/// Registrations are lost on restart. A conversation with an empty selector
/// set is registered but has no selector yet.
#[derive(Debug, Default)]
pub struct MemoryStore {
    registrations: RwLock<BTreeMap<ConversationId, BTreeSet<Selector>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows, counting a selector-less registration as one.
    pub async fn row_count(&self) -> usize {
        self.registrations
            .read()
            .await
            .values()
            .map(|selectors| selectors.len().max(1))
            .sum()
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn is_registered(&self, conversation: ConversationId) -> Result<bool, StoreError> {
        Ok(self.registrations.read().await.contains_key(&conversation))
    }

    async fn register(&self, conversation: ConversationId) -> Result<(), StoreError> {
        self.registrations
            .write()
            .await
            .entry(conversation)
            .or_default();
        Ok(())
    }

    async fn add_selector(
        &self,
        conversation: ConversationId,
        selector: &Selector,
    ) -> Result<(), StoreError> {
        let inserted = self
            .registrations
            .write()
            .await
            .entry(conversation)
            .or_default()
            .insert(selector.clone());
        debug!(%conversation, %selector, inserted, "memory store add");
        Ok(())
    }

    async fn remove_selector(
        &self,
        conversation: ConversationId,
        selector: &Selector,
    ) -> Result<(), StoreError> {
        // An emptied set keeps the conversation registered.
        if let Some(selectors) = self.registrations.write().await.get_mut(&conversation) {
            let removed = selectors.remove(selector);
            debug!(%conversation, %selector, removed, "memory store remove");
        }
        Ok(())
    }

    async fn matching_conversations(
        &self,
        selector: &Selector,
    ) -> Result<BTreeSet<ConversationId>, StoreError> {
        Ok(self
            .registrations
            .read()
            .await
            .iter()
            .filter(|(_, selectors)| selectors.contains(selector))
            .map(|(conversation, _)| *conversation)
            .collect())
    }

    async fn all_selectors(&self) -> Result<BTreeSet<Selector>, StoreError> {
        Ok(self
            .registrations
            .read()
            .await
            .values()
            .flatten()
            .cloned()
            .collect())
    }

    async fn conversations(&self) -> Result<BTreeSet<ConversationId>, StoreError> {
        Ok(self.registrations.read().await.keys().copied().collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
