//! Delivery of routed messages to destination chats.

use std::sync::Arc;

use relay_core::{Destination, RelayMessage};
use tracing::{error, info};

/// Counts for one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Messages accepted by the destination.
    pub delivered: usize,
    /// Messages the destination rejected.
    pub failed: usize,
}

/// Sends rendered relay messages, one per target chat.
#[derive(Clone)]
pub struct Dispatcher {
    destination: Arc<dyn Destination>,
}

impl Dispatcher {
    /// Create a dispatcher for a destination.
    pub fn new(destination: Arc<dyn Destination>) -> Self {
        Self { destination }
    }

    /// Send every message independently.
    ///
    /// A failed send is logged and counted; it never stops the remaining
    /// sends.
    pub async fn dispatch(&self, messages: &[RelayMessage]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for message in messages {
            let text = message.render();
            match self.destination.send_text(message.conversation, &text).await {
                Ok(()) => {
                    info!(conversation = %message.conversation, "Relayed: {}", text);
                    report.delivered += 1;
                }
                Err(e) => {
                    error!(
                        conversation = %message.conversation,
                        "Error sending message to Telegram: {}",
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_platform::RecordingDestination;
    use relay_core::ConversationId;

    fn message(conversation: i64, content: &str) -> RelayMessage {
        RelayMessage {
            conversation: ConversationId::new(conversation),
            guild_name: "Rustaceans".to_string(),
            channel_name: "general".to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_renders_each_message() {
        let destination = Arc::new(RecordingDestination::new());
        let dispatcher = Dispatcher::new(destination.clone());

        let report = dispatcher
            .dispatch(&[message(1, "hello"), message(2, "hello")])
            .await;

        assert_eq!(report, DispatchReport { delivered: 2, failed: 0 });
        assert_eq!(
            destination.sent(),
            vec![
                (ConversationId::new(1), "[Rustaceans/general] hello".to_string()),
                (ConversationId::new(2), "[Rustaceans/general] hello".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining_sends() {
        let destination = Arc::new(RecordingDestination::failing_for([ConversationId::new(1)]));
        let dispatcher = Dispatcher::new(destination.clone());

        let report = dispatcher
            .dispatch(&[message(1, "a"), message(2, "b"), message(3, "c")])
            .await;

        assert_eq!(report, DispatchReport { delivered: 2, failed: 1 });
        assert_eq!(destination.sent_to(ConversationId::new(3)), vec!["[Rustaceans/general] c"]);
    }

    #[tokio::test]
    async fn test_empty_dispatch() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingDestination::new()));
        assert_eq!(dispatcher.dispatch(&[]).await, DispatchReport::default());
    }
}
