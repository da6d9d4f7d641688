//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use relay::{AllowListScope, NameCacheConfig, RoutingPolicy, ThreadGate};

/// Which subscription store backs the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Memory,
}

/// Relay bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token.
    pub discord_token: String,
    /// Telegram bot token.
    pub telegram_token: String,
    /// Routing policy, including the thread gate for guild forwarding.
    pub policy: RoutingPolicy,
    /// Subscription store backend.
    pub store: StoreKind,
    /// SQLite database URL.
    pub database_url: String,
    /// Initial channel allow-list.
    pub channel_ids: Vec<String>,
    /// Capacity of the gateway to worker queue.
    pub queue_capacity: usize,
    /// Name cache settings.
    pub name_cache: NameCacheConfig,
    /// Telegram long-poll timeout.
    pub poll_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `DISCORD_TOKEN` | Discord bot token | (required) |
    /// | `TELEGRAM_TOKEN` | Telegram bot token | (required) |
    /// | `RELAY_POLICY` | `broadcast`, `allowlist`, `allowlist-per-chat`, `guild` or `channel` | `channel` |
    /// | `RELAY_STORE` | `sqlite` or `memory` | `sqlite` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:relay.db?mode=rwc` |
    /// | `DISCORD_CHANNEL_IDS` | Comma-separated initial allow-list | (empty) |
    /// | `BROADCAST_MARKER` | Text that always passes the thread gate | `@everyone` |
    /// | `PRIOR_MESSAGE_WINDOW` | Messages checked before a thread post (1-100) | `10` |
    /// | `JOIN_THREADS` | Join threads before gating | `true` |
    /// | `RELAY_QUEUE_CAPACITY` | Gateway queue size | `256` |
    /// | `NAME_CACHE_TTL_SECS` | Name cache lifetime | `300` |
    /// | `NAME_CACHE_CAPACITY` | Entries per name cache | `512` |
    /// | `TELEGRAM_POLL_TIMEOUT_SECS` | Long-poll timeout | `60` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let discord_token = var("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let telegram_token =
            var("TELEGRAM_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?;

        let defaults = ThreadGate::default();
        let gate = ThreadGate {
            marker: var("BROADCAST_MARKER").unwrap_or(defaults.marker),
            prior_window: parse_or(
                "PRIOR_MESSAGE_WINDOW",
                var("PRIOR_MESSAGE_WINDOW"),
                defaults.prior_window,
            )?,
            join_threads: match var("JOIN_THREADS") {
                Some(value) => parse_bool("JOIN_THREADS", &value)?,
                None => defaults.join_threads,
            },
        };
        if !(1..=100).contains(&gate.prior_window) {
            return Err(ConfigError::invalid("PRIOR_MESSAGE_WINDOW", gate.prior_window));
        }

        let policy = match var("RELAY_POLICY").as_deref().map(str::trim) {
            None | Some("channel") => RoutingPolicy::SingleChannel,
            Some("broadcast") => RoutingPolicy::Broadcast,
            Some("allowlist") => RoutingPolicy::ChannelAllowList {
                scope: AllowListScope::Shared,
            },
            Some("allowlist-per-chat") => RoutingPolicy::ChannelAllowList {
                scope: AllowListScope::PerConversation,
            },
            Some("guild") => RoutingPolicy::GuildForwarding(gate),
            Some(other) => return Err(ConfigError::invalid("RELAY_POLICY", other)),
        };

        let store = match var("RELAY_STORE").as_deref().map(str::trim) {
            None | Some("sqlite") => StoreKind::Sqlite,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(ConfigError::invalid("RELAY_STORE", other)),
        };

        let database_url =
            var("SQLITE_PATH").unwrap_or_else(|| "sqlite:relay.db?mode=rwc".to_string());

        let channel_ids = var("DISCORD_CHANNEL_IDS")
            .map(|ids| {
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let queue_capacity: usize =
            parse_or("RELAY_QUEUE_CAPACITY", var("RELAY_QUEUE_CAPACITY"), 256)?;
        if queue_capacity == 0 {
            return Err(ConfigError::invalid("RELAY_QUEUE_CAPACITY", queue_capacity));
        }

        let name_cache = NameCacheConfig {
            ttl: Duration::from_secs(parse_or(
                "NAME_CACHE_TTL_SECS",
                var("NAME_CACHE_TTL_SECS"),
                300,
            )?),
            capacity: parse_or("NAME_CACHE_CAPACITY", var("NAME_CACHE_CAPACITY"), 512)?,
        };

        let poll_timeout = Duration::from_secs(parse_or(
            "TELEGRAM_POLL_TIMEOUT_SECS",
            var("TELEGRAM_POLL_TIMEOUT_SECS"),
            60,
        )?);

        Ok(Self {
            discord_token,
            telegram_token,
            policy,
            store,
            database_url,
            channel_ids,
            queue_capacity,
            name_cache,
            poll_timeout,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(name, value)),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(name, value)),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid {name} value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl ConfigError {
    fn invalid(name: &'static str, value: impl ToString) -> Self {
        Self::Invalid {
            name,
            value: value.to_string(),
        }
    }
}
