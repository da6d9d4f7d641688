//! Routing policies.

/// Marker that lets a message through the thread gate regardless of history.
pub const DEFAULT_BROADCAST_MARKER: &str = "@everyone";

/// How many prior messages are fetched when deciding whether a message opens
/// its thread.
pub const DEFAULT_PRIOR_WINDOW: u8 = 10;

/// How matching works for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingPolicy {
    /// Every registered chat receives every message.
    Broadcast,

    /// The message's channel must be allow-listed.
    ChannelAllowList { scope: AllowListScope },

    /// The message's guild must be a stored selector and the message must
    /// pass the thread gate.
    GuildForwarding(ThreadGate),

    /// The message's channel is a stored selector mapped to exactly one chat.
    SingleChannel,
}

impl RoutingPolicy {
    /// Shorthand for the guild forwarding policy with default gate settings.
    pub fn guild_forwarding() -> Self {
        Self::GuildForwarding(ThreadGate::default())
    }

    /// Short name used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Broadcast => "broadcast",
            Self::ChannelAllowList {
                scope: AllowListScope::Shared,
            } => "allowlist",
            Self::ChannelAllowList {
                scope: AllowListScope::PerConversation,
            } => "allowlist-per-chat",
            Self::GuildForwarding(_) => "guild",
            Self::SingleChannel => "channel",
        }
    }
}

/// Who an allow-listed channel is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowListScope {
    /// One process-wide allow-list; matches go to every registered chat.
    Shared,
    /// Each chat holds its own channels; matches go to the chats that added them.
    PerConversation,
}

/// Extra condition applied by [`RoutingPolicy::GuildForwarding`].
///
/// A message passes when its content contains `marker`, or when it is the
/// first message of its channel (no prior message within `prior_window`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadGate {
    /// Literal that always passes the gate.
    pub marker: String,
    /// Number of prior messages fetched for the first-message check.
    pub prior_window: u8,
    /// Join the channel as a thread first, dropping messages from channels
    /// that cannot be joined.
    pub join_threads: bool,
}

impl Default for ThreadGate {
    fn default() -> Self {
        Self {
            marker: DEFAULT_BROADCAST_MARKER.to_string(),
            prior_window: DEFAULT_PRIOR_WINDOW,
            join_threads: true,
        }
    }
}
