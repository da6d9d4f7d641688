//! Discord to Telegram relay bot.
//!
//! Listens to Discord through the gateway, routes each message to the
//! Telegram chats that subscribed to it and takes `/add` and `/remove`
//! commands from those chats.

mod config;

use std::sync::Arc;

use database::Database;
use discord_source::{DiscordHandler, DiscordPlatform};
use relay::{
    run_delivery_worker, AllowList, CommandInterpreter, CommandTarget, Dispatcher, NameResolver,
    Relay, RoutingEngine,
};
use relay_core::{Destination, MemoryStore, SourcePlatform, SubscriptionStore};
use telegram_destination::{run_polling, InboundText, TelegramDestination};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, StoreKind};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str =
    "warn,relay=info,relay_bot=info,database=info,discord_source=info,telegram_destination=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env()?;
    info!(policy = config.policy.as_str(), "Starting relay bot");

    // Subscription store
    let (store, database): (Arc<dyn SubscriptionStore>, Option<Database>) = match config.store {
        StoreKind::Sqlite => {
            let db = Database::open(&config.database_url).await?;
            info!(url = %config.database_url, "Using SQLite subscription store");
            (Arc::new(db.clone()), Some(db))
        }
        StoreKind::Memory => {
            info!("Using in-memory subscription store");
            (Arc::new(MemoryStore::new()), None)
        }
    };

    // Telegram
    let bot = telegram_destination::connect(&config.telegram_token, config.poll_timeout).await?;
    let destination: Arc<dyn Destination> = Arc::new(TelegramDestination::new(bot.clone()));

    // Discord
    let (queue, signals) = mpsc::channel(config.queue_capacity);
    let mut client =
        discord_source::build_client(&config.discord_token, DiscordHandler::new(queue)).await?;
    let source: Arc<dyn SourcePlatform> = Arc::new(DiscordPlatform::new(client.http.clone()));
    let shard_manager = client.shard_manager.clone();

    // Routing and delivery
    let allow_list: AllowList = config.channel_ids.iter().map(String::as_str).collect();
    let commands = Arc::new(CommandInterpreter::new(
        store.clone(),
        destination.clone(),
        CommandTarget::for_policy(&config.policy, &allow_list),
    ));
    let engine = RoutingEngine::new(config.policy.clone(), store, source.clone(), allow_list);
    let relay = Arc::new(Relay::new(
        engine,
        NameResolver::new(source, config.name_cache),
        Dispatcher::new(destination),
    ));

    tokio::spawn(run_delivery_worker(signals, relay));
    let mut discord = tokio::spawn(async move { client.start().await });

    let cancel = CancellationToken::new();
    let mut polling = tokio::spawn(run_polling(
        bot,
        config.poll_timeout,
        cancel.clone(),
        move |inbound: InboundText| {
            let commands = commands.clone();
            async move {
                commands.handle(inbound.conversation, &inbound.text).await;
            }
        },
    ));

    info!("Relay started without errors");

    let result: Result<(), Box<dyn std::error::Error>> = tokio::select! {
        () = shutdown_signal() => {
            info!("Shutting down...");
            Ok(())
        }
        joined = &mut discord => match joined {
            Ok(Ok(())) => Err("Discord client stopped".into()),
            Ok(Err(e)) => Err(e.into()),
            Err(e) => Err(e.into()),
        },
        joined = &mut polling => match joined {
            Ok(Ok(())) => Err("Telegram polling stopped".into()),
            Ok(Err(e)) => Err(e.into()),
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = &result {
        error!("Relay stopped: {}", e);
    }

    cancel.cancel();
    shard_manager.shutdown_all().await;
    if let Some(db) = database {
        db.close().await;
    }

    result
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
