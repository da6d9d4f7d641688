//! Discord REST lookups used while routing and rendering.

use std::sync::Arc;

use async_trait::async_trait;
use relay_core::{ChannelInfo, GuildInfo, PriorMessage, SourcePlatform, TransportError};
use serenity::all::{Channel, ChannelId, GuildId, Http, MessageId};
use serenity::http::MessagePagination;
use tracing::debug;

use crate::error::DiscordError;

/// [`SourcePlatform`] backed by the Discord HTTP API.
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    /// Wrap the client's HTTP handle.
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Parse a snowflake. Discord ids are non-zero `u64`s.
fn parse_snowflake(kind: &'static str, id: &str) -> Result<u64, TransportError> {
    id.parse::<u64>()
        .ok()
        .filter(|value| *value != 0)
        .ok_or_else(|| TransportError::InvalidId {
            kind,
            id: id.to_string(),
        })
}

fn parse_channel(id: &str) -> Result<ChannelId, TransportError> {
    parse_snowflake("channel", id).map(ChannelId::new)
}

fn request_error(err: serenity::Error) -> TransportError {
    DiscordError::from(err).into()
}

#[async_trait]
impl SourcePlatform for DiscordPlatform {
    async fn resolve_channel(&self, channel_id: &str) -> Result<ChannelInfo, TransportError> {
        let id = parse_channel(channel_id)?;
        let channel = self.http.get_channel(id).await.map_err(request_error)?;

        match channel {
            Channel::Guild(channel) => Ok(ChannelInfo {
                name: channel.name,
                guild_id: Some(channel.guild_id.to_string()),
            }),
            _ => Ok(ChannelInfo {
                name: String::new(),
                guild_id: None,
            }),
        }
    }

    async fn resolve_guild(&self, guild_id: &str) -> Result<GuildInfo, TransportError> {
        let id = GuildId::new(parse_snowflake("guild", guild_id)?);
        let guild = self.http.get_guild(id).await.map_err(request_error)?;
        Ok(GuildInfo { name: guild.name })
    }

    async fn list_prior_messages(
        &self,
        channel_id: &str,
        before_message_id: &str,
        limit: u8,
    ) -> Result<Vec<PriorMessage>, TransportError> {
        let channel = parse_channel(channel_id)?;
        let before = MessageId::new(parse_snowflake("message", before_message_id)?);

        let messages = self
            .http
            .get_messages(channel, Some(MessagePagination::Before(before)), Some(limit))
            .await
            .map_err(request_error)?;

        debug!(channel_id, count = messages.len(), "Fetched prior messages");
        Ok(messages
            .into_iter()
            .map(|message| PriorMessage {
                id: message.id.to_string(),
            })
            .collect())
    }

    async fn join_thread(&self, channel_id: &str) -> Result<(), TransportError> {
        let id = parse_channel(channel_id)?;
        self.http.join_thread_channel(id).await.map_err(request_error)
    }
}
