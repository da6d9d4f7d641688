//! Process-wide channel allow-list.

use std::collections::BTreeSet;
use std::sync::Arc;

use relay_core::Selector;
use tokio::sync::RwLock;

/// Channels allowed through the shared allow-list policy.
///
/// Seeded from configuration and changed by `/add` and `/remove`. Cloning
/// shares the same set. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    channels: Arc<RwLock<BTreeSet<Selector>>>,
}

impl AllowList {
    /// Create an empty allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel. Returns whether it was newly added.
    pub async fn insert(&self, channel: Selector) -> bool {
        self.channels.write().await.insert(channel)
    }

    /// Remove a channel. Returns whether it was present.
    pub async fn remove(&self, channel: &Selector) -> bool {
        self.channels.write().await.remove(channel)
    }

    /// Whether a channel id is allowed.
    pub async fn contains(&self, channel_id: &str) -> bool {
        self.channels
            .read()
            .await
            .contains(&Selector::new(channel_id))
    }

    /// Current contents, sorted.
    pub async fn snapshot(&self) -> Vec<Selector> {
        self.channels.read().await.iter().cloned().collect()
    }
}

impl<S: Into<Selector>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            channels: Arc::new(RwLock::new(iter.into_iter().map(Into::into).collect())),
        }
    }
}
