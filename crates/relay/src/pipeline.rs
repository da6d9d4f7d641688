//! Event pipeline and delivery worker.

use std::sync::Arc;

use relay_core::{RelayMessage, SourceEvent, SourceSignal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dispatcher::{DispatchReport, Dispatcher};
use crate::names::NameResolver;
use crate::router::RoutingEngine;

/// Routes, renders and delivers source events.
pub struct Relay {
    engine: RoutingEngine,
    names: NameResolver,
    dispatcher: Dispatcher,
}

impl Relay {
    /// Create a relay.
    pub fn new(engine: RoutingEngine, names: NameResolver, dispatcher: Dispatcher) -> Self {
        Self {
            engine,
            names,
            dispatcher,
        }
    }

    /// The routing engine.
    pub fn engine(&self) -> &RoutingEngine {
        &self.engine
    }

    /// Relay one event to every chat it routes to.
    ///
    /// Names are only resolved when at least one chat matches. A failed name
    /// lookup abandons the event.
    pub async fn handle_event(&self, event: &SourceEvent) -> DispatchReport {
        let targets = self.engine.route(event).await;
        if targets.is_empty() {
            debug!(channel_id = %event.channel_id, "No matching chats");
            return DispatchReport::default();
        }

        let names = match self.names.resolve(event).await {
            Ok(names) => names,
            Err(e) => {
                warn!(
                    channel_id = %event.channel_id,
                    "Failed to resolve names, dropping event: {}",
                    e
                );
                return DispatchReport::default();
            }
        };

        let messages: Vec<RelayMessage> = targets
            .into_iter()
            .map(|conversation| RelayMessage {
                conversation,
                guild_name: names.guild_name.clone(),
                channel_name: names.channel_name.clone(),
                content: event.content.clone(),
            })
            .collect();

        self.dispatcher.dispatch(&messages).await
    }

    /// Handle one signal from the source gateway.
    ///
    /// Returns the dispatch report for events, `None` for invalidations.
    pub async fn handle_signal(&self, signal: SourceSignal) -> Option<DispatchReport> {
        match signal {
            SourceSignal::Event(event) => Some(self.handle_event(&event).await),
            SourceSignal::ChannelChanged(channel_id) => {
                self.names.invalidate_channel(&channel_id);
                None
            }
            SourceSignal::GuildChanged(guild_id) => {
                self.names.invalidate_guild(&guild_id);
                None
            }
        }
    }
}

/// Drain the gateway queue, one signal at a time, until every sender is
/// dropped.
pub async fn run_delivery_worker(mut receiver: mpsc::Receiver<SourceSignal>, relay: Arc<Relay>) {
    info!(
        "Starting delivery worker (policy: {})",
        relay.engine().policy().as_str()
    );

    while let Some(signal) = receiver.recv().await {
        if let Some(report) = relay.handle_signal(signal).await {
            if report.failed > 0 {
                warn!(
                    delivered = report.delivered,
                    failed = report.failed,
                    "Partial delivery"
                );
            }
        }
    }

    info!("Gateway queue closed, delivery worker stopped");
}
