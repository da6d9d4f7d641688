//! Serenity event handler feeding the relay queue.

use relay_core::{SourceEvent, SourceSignal};
use serenity::all::{
    Context, EventHandler, GatewayIntents, Guild, GuildChannel, Message, PartialGuild, Ready,
};
use serenity::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

/// Handler for Discord gateway events.
///
/// The gateway callback never waits on delivery: signals are pushed onto a
/// bounded queue and dropped with a warning when it is full.
pub struct DiscordHandler {
    queue: mpsc::Sender<SourceSignal>,
}

impl DiscordHandler {
    /// Create a handler that pushes onto `queue`.
    pub fn new(queue: mpsc::Sender<SourceSignal>) -> Self {
        Self { queue }
    }

    /// Gateway intents the relay needs.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }

    fn enqueue(&self, signal: SourceSignal) {
        match self.queue.try_send(signal) {
            Ok(()) => {}
            Err(TrySendError::Full(signal)) => {
                warn!("Relay queue full, dropping {}", describe(&signal));
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Relay queue closed, ignoring gateway event");
            }
        }
    }
}

/// Convert a gateway message into a relay event.
pub fn to_source_event(msg: &Message) -> SourceEvent {
    SourceEvent {
        message_id: msg.id.to_string(),
        channel_id: msg.channel_id.to_string(),
        guild_id: msg.guild_id.map(|g| g.to_string()),
        author: msg.author.name.clone(),
        content: msg.content.clone(),
    }
}

fn describe(signal: &SourceSignal) -> String {
    match signal {
        SourceSignal::Event(event) => format!("message {} in {}", event.message_id, event.channel_id),
        SourceSignal::ChannelChanged(id) => format!("channel update for {}", id),
        SourceSignal::GuildChanged(id) => format!("guild update for {}", id),
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "Discord bot ready"
        );
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        debug!(
            channel_id = %msg.channel_id,
            author = %msg.author.name,
            "Discord message received"
        );
        self.enqueue(SourceSignal::Event(to_source_event(&msg)));
    }

    async fn channel_update(&self, _ctx: Context, _old: Option<GuildChannel>, new: GuildChannel) {
        self.enqueue(SourceSignal::ChannelChanged(new.id.to_string()));
    }

    async fn thread_update(&self, _ctx: Context, _old: Option<GuildChannel>, new: GuildChannel) {
        self.enqueue(SourceSignal::ChannelChanged(new.id.to_string()));
    }

    async fn guild_update(
        &self,
        _ctx: Context,
        _old_data_if_available: Option<Guild>,
        new_data: PartialGuild,
    ) {
        self.enqueue(SourceSignal::GuildChanged(new_data.id.to_string()));
    }
}
