//! Platform collaborator traits.
//!
//! Abstracted so the routing engine can run against Discord and Telegram in
//! production and against recording doubles in tests.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{ChannelInfo, ConversationId, GuildInfo, PriorMessage};

/// Read access to the source platform.
#[async_trait]
pub trait SourcePlatform: Send + Sync {
    /// Look up a channel's name and owning guild.
    async fn resolve_channel(&self, channel_id: &str) -> Result<ChannelInfo, TransportError>;

    /// Look up a guild's name.
    async fn resolve_guild(&self, guild_id: &str) -> Result<GuildInfo, TransportError>;

    /// Up to `limit` messages posted in `channel_id` before `before_message_id`,
    /// newest first.
    async fn list_prior_messages(
        &self,
        channel_id: &str,
        before_message_id: &str,
        limit: u8,
    ) -> Result<Vec<PriorMessage>, TransportError>;

    /// Join a thread so its messages can be read. Fails for channels that are
    /// not threads.
    async fn join_thread(&self, channel_id: &str) -> Result<(), TransportError>;
}

/// Delivery to the destination platform.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Send a plain-text message to a conversation.
    async fn send_text(&self, conversation: ConversationId, text: &str)
        -> Result<(), TransportError>;
}
