//! End-to-end relay scenarios against the SQLite store.
//!
//! Run with:
//!   cargo test -p relay --test relay_flow

use std::sync::Arc;

use database::{registration, Database};
use mock_platform::{MockSource, RecordingDestination};
use relay::{
    AllowList, CommandInterpreter, CommandTarget, ConversationId, DispatchReport, Dispatcher,
    NameCacheConfig, NameResolver, Relay, RoutingEngine, RoutingPolicy, SourceEvent,
    CHANNEL_REGISTERED, CHANNEL_UNREGISTERED, CHAT_REGISTERED,
};
use relay_core::SubscriptionStore;

const CHAT: ConversationId = ConversationId::new(999);
const OTHER_CHAT: ConversationId = ConversationId::new(-100777);

struct Harness {
    db: Arc<Database>,
    destination: Arc<RecordingDestination>,
    source: Arc<MockSource>,
    commands: CommandInterpreter,
    relay: Relay,
}

async fn harness(policy: RoutingPolicy, source: MockSource) -> Harness {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let db = Arc::new(Database::open("sqlite::memory:").await.unwrap());

    let source = Arc::new(source);
    let destination = Arc::new(RecordingDestination::new());
    let allow_list = AllowList::new();

    let commands = CommandInterpreter::new(
        db.clone(),
        destination.clone(),
        CommandTarget::for_policy(&policy, &allow_list),
    );
    let engine = RoutingEngine::new(policy, db.clone(), source.clone(), allow_list);
    let names = NameResolver::new(source.clone(), NameCacheConfig::default());
    let relay = Relay::new(engine, names, Dispatcher::new(destination.clone()));

    Harness {
        db,
        destination,
        source,
        commands,
        relay,
    }
}

fn discord() -> MockSource {
    MockSource::new()
        .with_guild("g1", "Rustaceans")
        .with_channel("12345", "general", "g1")
        .with_channel("thread-1", "help-wanted", "g1")
}

#[tokio::test]
async fn add_then_relay_to_single_chat() {
    let h = harness(RoutingPolicy::SingleChannel, discord()).await;

    h.commands.handle(CHAT, "/add 12345").await;

    let rows = registration::list_registrations(h.db.pool()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].conversation_id, rows[0].selector.as_str()), (999, "12345"));
    assert_eq!(h.destination.sent_to(CHAT), vec![CHANNEL_REGISTERED]);

    h.destination.clear();
    let report = h
        .relay
        .handle_event(&SourceEvent::guild("m1", "12345", "g1", "hello"))
        .await;

    assert_eq!(report, DispatchReport { delivered: 1, failed: 0 });
    assert_eq!(h.destination.sent_to(CHAT), vec!["[Rustaceans/general] hello"]);
}

#[tokio::test]
async fn first_contact_registers_exactly_once() {
    let h = harness(RoutingPolicy::SingleChannel, discord()).await;

    assert!(!h.db.is_registered(CHAT).await.unwrap());
    h.commands.handle(CHAT, "hello bot").await;
    h.commands.handle(CHAT, "anyone there?").await;

    assert!(h.db.is_registered(CHAT).await.unwrap());
    assert_eq!(h.destination.sent_to(CHAT), vec![CHAT_REGISTERED]);
    assert_eq!(registration::count_registrations(h.db.pool()).await.unwrap(), 1);
}

#[tokio::test]
async fn remove_unknown_selector_leaves_rows() {
    let h = harness(RoutingPolicy::SingleChannel, discord()).await;
    h.commands.handle(CHAT, "/add 12345").await;
    let before = registration::count_registrations(h.db.pool()).await.unwrap();

    h.commands.handle(CHAT, "/remove 424242").await;

    let after = registration::count_registrations(h.db.pool()).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn removing_last_selector_does_not_greet_again() {
    let h = harness(RoutingPolicy::SingleChannel, discord()).await;

    h.commands.handle(CHAT, "hello").await;
    h.commands.handle(CHAT, "/add 12345").await;
    let outcome = h.commands.handle(CHAT, "/remove 12345").await;
    h.commands.handle(CHAT, "still here").await;

    assert!(!outcome.registered);
    assert_eq!(
        h.destination.sent_to(CHAT),
        vec![CHAT_REGISTERED, CHANNEL_REGISTERED, CHANNEL_UNREGISTERED]
    );
    assert!(h.db.is_registered(CHAT).await.unwrap());

    let report = h
        .relay
        .handle_event(&SourceEvent::guild("m1", "12345", "g1", "hello"))
        .await;
    assert_eq!(report, DispatchReport::default());
}

#[tokio::test]
async fn two_chats_get_independent_deliveries() {
    let h = harness(
        RoutingPolicy::ChannelAllowList {
            scope: relay::AllowListScope::PerConversation,
        },
        discord(),
    )
    .await;
    h.commands.handle(CHAT, "/add 12345").await;
    h.commands.handle(OTHER_CHAT, "/add 12345").await;
    h.destination.clear();

    let report = h
        .relay
        .handle_event(&SourceEvent::guild("m1", "12345", "g1", "hello"))
        .await;

    assert_eq!(report.delivered, 2);
    assert_eq!(h.destination.sent_to(CHAT), vec!["[Rustaceans/general] hello"]);
    assert_eq!(h.destination.sent_to(OTHER_CHAT), vec!["[Rustaceans/general] hello"]);
}

#[tokio::test]
async fn guild_forwarding_gates_replies() {
    let h = harness(
        RoutingPolicy::guild_forwarding(),
        discord().with_prior_messages("thread-1", 4),
    )
    .await;
    h.commands.handle(CHAT, "/add g1").await;
    h.destination.clear();

    let reply = SourceEvent::guild("m5", "thread-1", "g1", "thanks!");
    assert_eq!(h.relay.handle_event(&reply).await.delivered, 0);

    let ping = SourceEvent::guild("m6", "thread-1", "g1", "@everyone new release");
    assert_eq!(h.relay.handle_event(&ping).await.delivered, 1);

    let opener = SourceEvent::guild("m1", "12345", "g1", "first post");
    assert_eq!(h.relay.handle_event(&opener).await.delivered, 1);

    assert_eq!(
        h.destination.sent_to(CHAT),
        vec![
            "[Rustaceans/help-wanted] @everyone new release",
            "[Rustaceans/general] first post",
        ]
    );
    assert_eq!(h.source.history_lookups(), 2);
}

#[tokio::test]
async fn broadcast_ignores_commands_and_reaches_everyone() {
    let h = harness(RoutingPolicy::Broadcast, discord()).await;
    h.commands.handle(CHAT, "/add 12345").await;
    h.commands.handle(OTHER_CHAT, "hi").await;

    assert!(h.db.all_selectors().await.unwrap().is_empty());
    h.destination.clear();

    let report = h
        .relay
        .handle_event(&SourceEvent::guild("m1", "12345", "g1", "hello"))
        .await;
    assert_eq!(report.delivered, 2);
}

#[tokio::test]
async fn store_failure_is_treated_as_no_match() {
    let h = harness(RoutingPolicy::SingleChannel, discord()).await;
    h.commands.handle(CHAT, "/add 12345").await;
    h.destination.clear();
    h.db.close().await;

    let report = h
        .relay
        .handle_event(&SourceEvent::guild("m1", "12345", "g1", "hello"))
        .await;
    assert_eq!(report, DispatchReport::default());

    // Commands against a closed store are not confirmed.
    let outcome = h.commands.handle(OTHER_CHAT, "/add 12345").await;
    assert!(outcome.applied.is_none());
    assert!(!outcome.registered);
    assert!(h.destination.sent().is_empty());
}
