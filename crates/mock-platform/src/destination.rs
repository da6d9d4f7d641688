//! Recording destination platform.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use relay_core::{ConversationId, Destination, TransportError};

/// A [`Destination`] that records every message instead of sending it.
///
/// Conversations listed with [`failing_for`](Self::failing_for) reject every
/// send, which is useful for checking failure isolation.
#[derive(Debug, Default)]
pub struct RecordingDestination {
    sent: Mutex<Vec<(ConversationId, String)>>,
    failing: HashSet<ConversationId>,
}

impl RecordingDestination {
    /// Create a destination that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a destination that rejects sends to the given conversations.
    pub fn failing_for(conversations: impl IntoIterator<Item = ConversationId>) -> Self {
        Self {
            sent: Mutex::default(),
            failing: conversations.into_iter().collect(),
        }
    }

    /// Every successful send, in order.
    pub fn sent(&self) -> Vec<(ConversationId, String)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Texts successfully sent to one conversation, in order.
    pub fn sent_to(&self, conversation: ConversationId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(target, _)| *target == conversation)
            .map(|(_, text)| text)
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl Destination for RecordingDestination {
    async fn send_text(
        &self,
        conversation: ConversationId,
        text: &str,
    ) -> Result<(), TransportError> {
        if self.failing.contains(&conversation) {
            return Err(TransportError::SendFailed(format!(
                "chat {conversation} rejected the message"
            )));
        }

        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((conversation, text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_order() {
        let destination = RecordingDestination::new();
        let chat = ConversationId::new(1);

        destination.send_text(chat, "first").await.unwrap();
        destination.send_text(ConversationId::new(2), "other").await.unwrap();
        destination.send_text(chat, "second").await.unwrap();

        assert_eq!(destination.sent_to(chat), vec!["first", "second"]);
        assert_eq!(destination.sent().len(), 3);

        destination.clear();
        assert!(destination.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failing_conversation() {
        let destination = RecordingDestination::failing_for([ConversationId::new(7)]);

        let result = destination.send_text(ConversationId::new(7), "hi").await;
        assert!(matches!(result, Err(TransportError::SendFailed(_))));
        assert!(destination.sent().is_empty());
    }
}
