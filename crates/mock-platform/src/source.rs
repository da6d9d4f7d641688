//! Scripted source platform.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use relay_core::{ChannelInfo, GuildInfo, PriorMessage, SourcePlatform, TransportError};

/// A [`SourcePlatform`] answering from fixed tables.
///
/// Every channel is joinable as a thread unless marked with
/// [`with_plain_channel`](Self::with_plain_channel). Channels have no prior
/// messages unless given some with
/// [`with_prior_messages`](Self::with_prior_messages).
#[derive(Debug, Default)]
pub struct MockSource {
    channels: Mutex<HashMap<String, ChannelInfo>>,
    guilds: Mutex<HashMap<String, GuildInfo>>,
    prior_messages: HashMap<String, usize>,
    plain_channels: HashSet<String>,
    history_fails: bool,
    channel_lookups: AtomicUsize,
    guild_lookups: AtomicUsize,
    history_lookups: AtomicUsize,
    joins: AtomicUsize,
}

impl MockSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a guild channel.
    pub fn with_channel(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        guild_id: impl Into<String>,
    ) -> Self {
        self.set_channel(id, name, Some(guild_id.into()));
        self
    }

    /// Add a channel with no guild (a DM channel).
    pub fn with_direct_channel(self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.set_channel(id, name, None);
        self
    }

    /// Add a guild.
    pub fn with_guild(self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.rename_guild(id, name);
        self
    }

    /// Give a channel `count` messages of history.
    pub fn with_prior_messages(mut self, channel_id: impl Into<String>, count: usize) -> Self {
        self.prior_messages.insert(channel_id.into(), count);
        self
    }

    /// Mark a channel as a regular channel that cannot be joined as a thread.
    pub fn with_plain_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.plain_channels.insert(channel_id.into());
        self
    }

    /// Make every history lookup fail.
    pub fn with_failing_history(mut self) -> Self {
        self.history_fails = true;
        self
    }

    /// Rename a channel, keeping its guild.
    pub fn rename_channel(&self, id: &str, name: impl Into<String>) {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(channel) = channels.get_mut(id) {
            channel.name = name.into();
        }
    }

    /// Rename (or add) a guild.
    pub fn rename_guild(&self, id: impl Into<String>, name: impl Into<String>) {
        self.guilds
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.into(), GuildInfo { name: name.into() });
    }

    /// Number of `resolve_channel` calls so far.
    pub fn channel_lookups(&self) -> usize {
        self.channel_lookups.load(Ordering::SeqCst)
    }

    /// Number of `resolve_guild` calls so far.
    pub fn guild_lookups(&self) -> usize {
        self.guild_lookups.load(Ordering::SeqCst)
    }

    /// Number of `list_prior_messages` calls so far.
    pub fn history_lookups(&self) -> usize {
        self.history_lookups.load(Ordering::SeqCst)
    }

    /// Number of `join_thread` calls so far.
    pub fn joins(&self) -> usize {
        self.joins.load(Ordering::SeqCst)
    }

    fn set_channel(&self, id: impl Into<String>, name: impl Into<String>, guild_id: Option<String>) {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                id.into(),
                ChannelInfo {
                    name: name.into(),
                    guild_id,
                },
            );
    }
}

#[async_trait]
impl SourcePlatform for MockSource {
    async fn resolve_channel(&self, channel_id: &str) -> Result<ChannelInfo, TransportError> {
        self.channel_lookups.fetch_add(1, Ordering::SeqCst);
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(channel_id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound {
                kind: "channel",
                id: channel_id.to_string(),
            })
    }

    async fn resolve_guild(&self, guild_id: &str) -> Result<GuildInfo, TransportError> {
        self.guild_lookups.fetch_add(1, Ordering::SeqCst);
        self.guilds
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(guild_id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound {
                kind: "guild",
                id: guild_id.to_string(),
            })
    }

    async fn list_prior_messages(
        &self,
        channel_id: &str,
        _before_message_id: &str,
        limit: u8,
    ) -> Result<Vec<PriorMessage>, TransportError> {
        self.history_lookups.fetch_add(1, Ordering::SeqCst);
        if self.history_fails {
            return Err(TransportError::Request("history unavailable".to_string()));
        }

        let count = self
            .prior_messages
            .get(channel_id)
            .copied()
            .unwrap_or(0)
            .min(usize::from(limit));

        Ok((0..count)
            .map(|i| PriorMessage {
                id: format!("{channel_id}-{i}"),
            })
            .collect())
    }

    async fn join_thread(&self, channel_id: &str) -> Result<(), TransportError> {
        self.joins.fetch_add(1, Ordering::SeqCst);
        if self.plain_channels.contains(channel_id) {
            return Err(TransportError::Request(format!(
                "channel {channel_id} is not a thread"
            )));
        }
        Ok(())
    }
}
