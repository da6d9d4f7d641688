//! [`SubscriptionStore`] implementation backed by SQLite.

use std::collections::BTreeSet;

use async_trait::async_trait;
use relay_core::{ConversationId, Selector, StoreError, SubscriptionStore};
use tracing::debug;

use crate::registration;
use crate::Database;

#[async_trait]
impl SubscriptionStore for Database {
    async fn is_registered(&self, conversation: ConversationId) -> Result<bool, StoreError> {
        Ok(registration::is_registered(self.pool(), conversation.get()).await?)
    }

    async fn register(&self, conversation: ConversationId) -> Result<(), StoreError> {
        let inserted = registration::register(self.pool(), conversation.get()).await?;
        debug!(%conversation, inserted, "register conversation");
        Ok(())
    }

    async fn add_selector(
        &self,
        conversation: ConversationId,
        selector: &Selector,
    ) -> Result<(), StoreError> {
        let inserted =
            registration::add_selector(self.pool(), conversation.get(), selector.as_str()).await?;
        debug!(%conversation, %selector, inserted, "add selector");
        Ok(())
    }

    async fn remove_selector(
        &self,
        conversation: ConversationId,
        selector: &Selector,
    ) -> Result<(), StoreError> {
        let removed =
            registration::remove_selector(self.pool(), conversation.get(), selector.as_str())
                .await?;
        debug!(%conversation, %selector, removed, "remove selector");
        Ok(())
    }

    async fn matching_conversations(
        &self,
        selector: &Selector,
    ) -> Result<BTreeSet<ConversationId>, StoreError> {
        let ids = registration::matching_conversations(self.pool(), selector.as_str()).await?;
        Ok(ids.into_iter().map(ConversationId::new).collect())
    }

    async fn all_selectors(&self) -> Result<BTreeSet<Selector>, StoreError> {
        let selectors = registration::all_selectors(self.pool()).await?;
        Ok(selectors.into_iter().map(Selector::from).collect())
    }

    async fn conversations(&self) -> Result<BTreeSet<ConversationId>, StoreError> {
        let ids = registration::conversations(self.pool()).await?;
        Ok(ids.into_iter().map(ConversationId::new).collect())
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
