//! Message and identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A destination conversation (Telegram chat id).
///
/// Group chats have negative ids, so this wraps a signed integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(i64);

impl ConversationId {
    /// Wrap a raw chat id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw chat id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A source channel id or guild id used as a routing key.
///
/// Selectors are opaque: they are never validated against the source
/// platform, so an unknown selector simply never matches.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(String);

impl Selector {
    /// Create a selector from a channel or guild id literal.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The selector literal.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Selector {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Selector {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message observed on the source platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEvent {
    /// Source message id.
    pub message_id: String,
    /// Channel (or thread) the message was posted in.
    pub channel_id: String,
    /// Guild the channel belongs to, absent for direct messages.
    pub guild_id: Option<String>,
    /// Display name of the author.
    pub author: String,
    /// Raw text content.
    pub content: String,
}

impl SourceEvent {
    /// Create an event posted in a guild channel.
    pub fn guild(
        message_id: impl Into<String>,
        channel_id: impl Into<String>,
        guild_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            channel_id: channel_id.into(),
            guild_id: Some(guild_id.into()),
            author: String::new(),
            content: content.into(),
        }
    }

    /// Create an event with no guild (a direct message).
    pub fn direct(
        message_id: impl Into<String>,
        channel_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            channel_id: channel_id.into(),
            guild_id: None,
            author: String::new(),
            content: content.into(),
        }
    }

    /// Set the author display name.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// The channel id as a selector.
    pub fn channel_selector(&self) -> Selector {
        Selector::new(self.channel_id.as_str())
    }

    /// The guild id as a selector, if the event came from a guild.
    pub fn guild_selector(&self) -> Option<Selector> {
        self.guild_id.as_deref().map(Selector::new)
    }
}

/// Channel details returned by the source platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel display name.
    pub name: String,
    /// Owning guild, if any.
    pub guild_id: Option<String>,
}

/// Guild details returned by the source platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildInfo {
    /// Guild display name.
    pub name: String,
}

/// A message that precedes another one in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorMessage {
    /// Source message id.
    pub id: String,
}

/// A routed source event, ready for delivery to one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Target conversation.
    pub conversation: ConversationId,
    /// Resolved guild name.
    pub guild_name: String,
    /// Resolved channel name.
    pub channel_name: String,
    /// Raw message content.
    pub content: String,
}

impl RelayMessage {
    /// Render the single line delivered to the destination.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RelayMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.guild_name, self.channel_name, self.content)
    }
}

/// Work handed from the source gateway to the delivery worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSignal {
    /// A new message to route.
    Event(SourceEvent),
    /// A channel was renamed or moved; cached names are stale.
    ChannelChanged(String),
    /// A guild was renamed; cached names are stale.
    GuildChanged(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_message_render() {
        let message = RelayMessage {
            conversation: ConversationId::new(999),
            guild_name: "Rustaceans".to_string(),
            channel_name: "general".to_string(),
            content: "hello".to_string(),
        };
        assert_eq!(message.render(), "[Rustaceans/general] hello");
    }

    #[test]
    fn test_render_keeps_content_verbatim() {
        let message = RelayMessage {
            conversation: ConversationId::new(1),
            guild_name: "g".to_string(),
            channel_name: "c".to_string(),
            content: "  spaced  @everyone ".to_string(),
        };
        assert_eq!(message.render(), "[g/c]   spaced  @everyone ");
    }

    #[test]
    fn test_event_selectors() {
        let event = SourceEvent::guild("1", "12345", "g1", "hi").with_author("alice");
        assert_eq!(event.channel_selector(), Selector::new("12345"));
        assert_eq!(event.guild_selector(), Some(Selector::new("g1")));
        assert_eq!(event.author, "alice");

        let dm = SourceEvent::direct("2", "555", "hi");
        assert!(dm.guild_selector().is_none());
    }

    #[test]
    fn test_conversation_id_display() {
        assert_eq!(ConversationId::new(-100123).to_string(), "-100123");
        assert_eq!(ConversationId::from(42).get(), 42);
    }
}
