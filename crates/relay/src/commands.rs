//! Command interpreter for inbound Telegram text.

use std::sync::Arc;

use relay_core::{ConversationId, Destination, Selector, SubscriptionStore};
use tracing::{debug, error, info, warn};

use crate::allowlist::AllowList;
use crate::policy::{AllowListScope, RoutingPolicy};

/// Reply to a successful `/add`.
pub const CHANNEL_REGISTERED: &str = "Discord channel registered";

/// Reply to a successful `/remove`.
pub const CHANNEL_UNREGISTERED: &str = "Discord channel unregistered";

/// Reply to the first message from a new chat.
pub const CHAT_REGISTERED: &str = "Chat registered";

/// A parsed registration command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/add <selector>`
    Add(Selector),
    /// `/remove <selector>`
    Remove(Selector),
}

impl Command {
    /// Parse a message. Anything other than a known verb followed by an
    /// argument yields `None`; tokens after the argument are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let verb = tokens.next()?;
        let argument = tokens.next()?;

        match verb {
            "/add" => Some(Self::Add(Selector::new(argument))),
            "/remove" => Some(Self::Remove(Selector::new(argument))),
            _ => None,
        }
    }

    /// The selector the command refers to.
    pub fn selector(&self) -> &Selector {
        match self {
            Self::Add(selector) | Self::Remove(selector) => selector,
        }
    }

    fn confirmation(&self) -> &'static str {
        match self {
            Self::Add(_) => CHANNEL_REGISTERED,
            Self::Remove(_) => CHANNEL_UNREGISTERED,
        }
    }
}

/// What `/add` and `/remove` change.
#[derive(Debug, Clone)]
pub enum CommandTarget {
    /// Commands are ignored.
    Disabled,
    /// Commands edit the shared in-memory allow-list.
    AllowList(AllowList),
    /// Commands edit the sending chat's rows in the subscription store.
    Store,
}

impl CommandTarget {
    /// The target matching a routing policy.
    ///
    /// Broadcast has nothing to select, the shared allow-list edits the
    /// process-wide list, and every other policy edits the store.
    pub fn for_policy(policy: &RoutingPolicy, allow_list: &AllowList) -> Self {
        match policy {
            RoutingPolicy::Broadcast => Self::Disabled,
            RoutingPolicy::ChannelAllowList {
                scope: AllowListScope::Shared,
            } => Self::AllowList(allow_list.clone()),
            _ => Self::Store,
        }
    }
}

/// What handling one message did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// The command that was applied and confirmed, if any.
    pub applied: Option<Command>,
    /// Whether this message registered the chat for the first time.
    pub registered: bool,
}

/// Applies registration commands from destination chats.
pub struct CommandInterpreter {
    store: Arc<dyn SubscriptionStore>,
    destination: Arc<dyn Destination>,
    target: CommandTarget,
}

impl CommandInterpreter {
    /// Create an interpreter.
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        destination: Arc<dyn Destination>,
        target: CommandTarget,
    ) -> Self {
        Self {
            store,
            destination,
            target,
        }
    }

    /// Handle one inbound message from `conversation`.
    ///
    /// Applies `/add` or `/remove` when present, then registers the chat if
    /// it is new. Each step is confirmed only if it succeeded; malformed
    /// commands get no reply.
    pub async fn handle(&self, conversation: ConversationId, text: &str) -> CommandOutcome {
        let mut outcome = CommandOutcome::default();

        match Command::parse(text) {
            Some(command) => {
                if self.apply(conversation, &command).await {
                    self.reply(conversation, command.confirmation()).await;
                    outcome.applied = Some(command);
                }
            }
            None => debug!(%conversation, "Not a command"),
        }

        outcome.registered = self.register_if_new(conversation).await;
        outcome
    }

    async fn apply(&self, conversation: ConversationId, command: &Command) -> bool {
        match &self.target {
            CommandTarget::Disabled => {
                debug!(%conversation, "Commands disabled, ignoring {:?}", command);
                false
            }
            CommandTarget::AllowList(allow_list) => {
                match command {
                    Command::Add(selector) => allow_list.insert(selector.clone()).await,
                    Command::Remove(selector) => allow_list.remove(selector).await,
                };
                info!(%conversation, selector = %command.selector(), "Allow-list updated: {:?}", command);
                true
            }
            CommandTarget::Store => {
                let result = match command {
                    Command::Add(selector) => self.store.add_selector(conversation, selector).await,
                    Command::Remove(selector) => {
                        self.store.remove_selector(conversation, selector).await
                    }
                };

                match result {
                    Ok(()) => {
                        info!(%conversation, selector = %command.selector(), "Registration updated: {:?}", command);
                        true
                    }
                    Err(e) => {
                        error!(%conversation, "Failed to apply {:?}: {}", command, e);
                        false
                    }
                }
            }
        }
    }

    async fn register_if_new(&self, conversation: ConversationId) -> bool {
        match self.store.is_registered(conversation).await {
            Ok(true) => false,
            Ok(false) => match self.store.register(conversation).await {
                Ok(()) => {
                    info!(%conversation, "Registered new chat");
                    self.reply(conversation, CHAT_REGISTERED).await;
                    true
                }
                Err(e) => {
                    error!(%conversation, "Failed to register chat: {}", e);
                    false
                }
            },
            Err(e) => {
                error!(%conversation, "Failed to check registration: {}", e);
                false
            }
        }
    }

    async fn reply(&self, conversation: ConversationId, text: &str) {
        if let Err(e) = self.destination.send_text(conversation, text).await {
            warn!(%conversation, "Failed to send confirmation: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_platform::RecordingDestination;
    use relay_core::MemoryStore;

    const CHAT: ConversationId = ConversationId::new(999);

    fn interpreter(
        target: CommandTarget,
    ) -> (CommandInterpreter, Arc<MemoryStore>, Arc<RecordingDestination>) {
        let store = Arc::new(MemoryStore::new());
        let destination = Arc::new(RecordingDestination::new());
        let interpreter = CommandInterpreter::new(store.clone(), destination.clone(), target);
        (interpreter, store, destination)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("/add 12345"),
            Some(Command::Add(Selector::new("12345")))
        );
        assert_eq!(
            Command::parse("  /remove   12345 trailing words"),
            Some(Command::Remove(Selector::new("12345")))
        );
        assert_eq!(Command::parse("/add"), None);
        assert_eq!(Command::parse("/list 12345"), None);
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[tokio::test]
    async fn test_add_command_scenario() {
        let (interpreter, store, destination) = interpreter(CommandTarget::Store);

        let outcome = interpreter.handle(CHAT, "/add 12345").await;

        assert_eq!(outcome.applied, Some(Command::Add(Selector::new("12345"))));
        assert!(!outcome.registered);
        assert_eq!(
            store.matching_conversations(&Selector::new("12345")).await.unwrap().len(),
            1
        );
        assert_eq!(destination.sent_to(CHAT), vec![CHANNEL_REGISTERED]);
    }

    #[tokio::test]
    async fn test_first_contact_registers_once() {
        let (interpreter, store, destination) = interpreter(CommandTarget::Store);

        assert!(interpreter.handle(CHAT, "hi").await.registered);
        assert!(!interpreter.handle(CHAT, "hi again").await.registered);

        assert!(store.is_registered(CHAT).await.unwrap());
        assert_eq!(destination.sent_to(CHAT), vec![CHAT_REGISTERED]);
    }

    #[tokio::test]
    async fn test_remove_unknown_selector() {
        let (interpreter, store, destination) = interpreter(CommandTarget::Store);
        interpreter.handle(CHAT, "/add 12345").await;
        let rows_before = store.row_count().await;

        let outcome = interpreter.handle(CHAT, "/remove 99999").await;

        assert!(outcome.applied.is_some());
        assert_eq!(store.row_count().await, rows_before);
        assert_eq!(
            destination.sent_to(CHAT),
            vec![CHANNEL_REGISTERED, CHANNEL_UNREGISTERED]
        );
    }

    #[tokio::test]
    async fn test_malformed_commands_get_no_reply() {
        let (interpreter, _store, destination) = interpreter(CommandTarget::Store);
        interpreter.handle(CHAT, "hello").await;
        destination.clear();

        for text in ["/add", "/remove", "/subscribe 12345", "add 12345"] {
            let outcome = interpreter.handle(CHAT, text).await;
            assert_eq!(outcome, CommandOutcome::default());
        }
        assert!(destination.sent().is_empty());
    }

    #[tokio::test]
    async fn test_allow_list_target_leaves_store_alone() {
        let allow_list = AllowList::new();
        let (interpreter, store, destination) =
            interpreter(CommandTarget::AllowList(allow_list.clone()));

        let outcome = interpreter.handle(CHAT, "/add 12345").await;

        assert!(outcome.applied.is_some());
        assert!(outcome.registered);
        assert!(allow_list.contains("12345").await);
        assert!(store.all_selectors().await.unwrap().is_empty());
        assert_eq!(
            destination.sent_to(CHAT),
            vec![CHANNEL_REGISTERED, CHAT_REGISTERED]
        );

        interpreter.handle(CHAT, "/remove 12345").await;
        assert!(!allow_list.contains("12345").await);
    }

    #[tokio::test]
    async fn test_disabled_target_only_registers() {
        let (interpreter, store, destination) = interpreter(CommandTarget::Disabled);

        let outcome = interpreter.handle(CHAT, "/add 12345").await;

        assert!(outcome.applied.is_none());
        assert!(outcome.registered);
        assert!(store.all_selectors().await.unwrap().is_empty());
        assert_eq!(destination.sent_to(CHAT), vec![CHAT_REGISTERED]);
    }

    #[tokio::test]
    async fn test_failed_confirmation_does_not_undo_command() {
        let store = Arc::new(MemoryStore::new());
        let destination = Arc::new(RecordingDestination::failing_for([CHAT]));
        let interpreter = CommandInterpreter::new(store.clone(), destination, CommandTarget::Store);

        let outcome = interpreter.handle(CHAT, "/add 12345").await;

        assert!(outcome.applied.is_some());
        assert!(store.is_registered(CHAT).await.unwrap());
    }

    #[test]
    fn test_target_for_policy() {
        let allow_list = AllowList::new();
        assert!(matches!(
            CommandTarget::for_policy(&RoutingPolicy::Broadcast, &allow_list),
            CommandTarget::Disabled
        ));
        assert!(matches!(
            CommandTarget::for_policy(
                &RoutingPolicy::ChannelAllowList {
                    scope: AllowListScope::Shared
                },
                &allow_list
            ),
            CommandTarget::AllowList(_)
        ));
        assert!(matches!(
            CommandTarget::for_policy(&RoutingPolicy::SingleChannel, &allow_list),
            CommandTarget::Store
        ));
        assert!(matches!(
            CommandTarget::for_policy(&RoutingPolicy::guild_forwarding(), &allow_list),
            CommandTarget::Store
        ));
    }
}
