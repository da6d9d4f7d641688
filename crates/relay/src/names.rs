//! Cached guild and channel name resolution.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lru::LruCache;
use relay_core::{ChannelInfo, GuildInfo, SourceEvent, SourcePlatform, TransportError};
use tracing::debug;

use crate::error::ResolveError;

/// Default time a resolved name is trusted (5 minutes).
const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default number of channels and of guilds kept.
const DEFAULT_CAPACITY: usize = 512;

/// Name cache settings.
#[derive(Debug, Clone, Copy)]
pub struct NameCacheConfig {
    /// How long a cached name is used before it is fetched again.
    pub ttl: Duration,
    /// Entries kept per cache (channels and guilds are cached separately).
    pub capacity: usize,
}

impl Default for NameCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Display names for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    pub guild_name: String,
    pub channel_name: String,
}

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

type Cache<T> = Mutex<LruCache<String, Cached<T>>>;

/// Resolves channel and guild names through the source platform, caching
/// results by id.
///
/// Names rarely change, so lookups are cached until they expire or are
/// invalidated by a channel or guild update from the gateway.
pub struct NameResolver {
    source: Arc<dyn SourcePlatform>,
    channels: Cache<ChannelInfo>,
    guilds: Cache<GuildInfo>,
    ttl: Duration,
}

impl NameResolver {
    /// Create a resolver.
    pub fn new(source: Arc<dyn SourcePlatform>, config: NameCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            source,
            channels: Mutex::new(LruCache::new(capacity)),
            guilds: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
        }
    }

    /// Resolve the guild and channel names for an event.
    ///
    /// The guild is the one the channel reports, falling back to the event's
    /// guild id.
    pub async fn resolve(&self, event: &SourceEvent) -> Result<ResolvedNames, ResolveError> {
        let channel = self.channel(&event.channel_id).await?;
        let guild_id = channel
            .guild_id
            .as_deref()
            .or(event.guild_id.as_deref())
            .ok_or_else(|| ResolveError::NoGuild {
                channel_id: event.channel_id.clone(),
            })?;
        let guild = self.guild(guild_id).await?;

        Ok(ResolvedNames {
            guild_name: guild.name,
            channel_name: channel.name,
        })
    }

    /// Drop the cached entry for a channel.
    pub fn invalidate_channel(&self, channel_id: &str) {
        if lock(&self.channels).pop(channel_id).is_some() {
            debug!(channel_id, "Invalidated cached channel name");
        }
    }

    /// Drop the cached entry for a guild.
    pub fn invalidate_guild(&self, guild_id: &str) {
        if lock(&self.guilds).pop(guild_id).is_some() {
            debug!(guild_id, "Invalidated cached guild name");
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        lock(&self.channels).clear();
        lock(&self.guilds).clear();
    }

    async fn channel(&self, channel_id: &str) -> Result<ChannelInfo, TransportError> {
        if let Some(info) = self.cached(&self.channels, channel_id) {
            return Ok(info);
        }

        let info = self.source.resolve_channel(channel_id).await?;
        store(&self.channels, channel_id, info.clone());
        Ok(info)
    }

    async fn guild(&self, guild_id: &str) -> Result<GuildInfo, TransportError> {
        if let Some(info) = self.cached(&self.guilds, guild_id) {
            return Ok(info);
        }

        let info = self.source.resolve_guild(guild_id).await?;
        store(&self.guilds, guild_id, info.clone());
        Ok(info)
    }

    fn cached<T: Clone>(&self, cache: &Cache<T>, id: &str) -> Option<T> {
        let mut cache = lock(cache);
        let expired = match cache.get(id) {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => {
                return Some(entry.value.clone())
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            cache.pop(id);
        }
        None
    }
}

fn lock<T>(cache: &Cache<T>) -> std::sync::MutexGuard<'_, LruCache<String, Cached<T>>> {
    cache.lock().unwrap_or_else(|e| e.into_inner())
}

fn store<T>(cache: &Cache<T>, id: &str, value: T) {
    lock(cache).put(
        id.to_string(),
        Cached {
            value,
            fetched_at: Instant::now(),
        },
    );
}
