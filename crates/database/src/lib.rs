//! SQLite persistence layer for the relay.
//!
//! This crate provides async database operations for registrations (which
//! Discord channel or guild feeds which Telegram chat) using SQLx with
//! SQLite. [`Database`] implements [`relay_core::SubscriptionStore`].
//!
//! # Example
//!
//! ```no_run
//! use database::{registration, Database};
//!
//! # async fn example() -> database::Result<()> {
//! let db = Database::open("sqlite:relay.db?mode=rwc").await?;
//!
//! // Route Discord channel 12345 to Telegram chat 999
//! registration::add_selector(db.pool(), 999, "12345").await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod models;
pub mod registration;
mod store;

pub use error::{DatabaseError, Result};
pub use models::{Registration, REGISTERED_MARKER};

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Pool size.
const MAX_CONNECTIONS: u32 = 4;

/// Registration database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database at `url` and bring its schema up to date.
    ///
    /// `sqlite::memory:` gives a private in-memory database, which is what
    /// the tests use.
    pub async fn open(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(url, "Registration database ready");

        Ok(Self { pool })
    }

    /// The connection pool, for the functions in [`registration`].
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection. Later operations fail with
    /// [`relay_core::StoreError::Closed`].
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{ConversationId, Selector, StoreError, SubscriptionStore};
    use std::collections::BTreeSet;

    async fn test_db() -> Database {
        Database::open("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_add_selector_scenario() {
        let db = test_db().await;

        registration::add_selector(db.pool(), 999, "12345").await.unwrap();

        let rows = registration::list_registrations(db.pool()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].conversation_id, 999);
        assert_eq!(rows[0].selector, "12345");
        assert!(!rows[0].is_marker());
    }

    #[tokio::test]
    async fn test_register_once() {
        let db = test_db().await;

        assert!(!registration::is_registered(db.pool(), 999).await.unwrap());
        assert!(registration::register(db.pool(), 999).await.unwrap());
        assert!(!registration::register(db.pool(), 999).await.unwrap());
        assert!(registration::is_registered(db.pool(), 999).await.unwrap());

        let rows = registration::list_registrations(db.pool()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_marker());
    }

    #[tokio::test]
    async fn test_marker_replaced_by_selector() {
        let db = test_db().await;

        registration::register(db.pool(), 999).await.unwrap();
        registration::add_selector(db.pool(), 999, "12345").await.unwrap();

        let rows = registration::list_registrations(db.pool()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].selector, "12345");

        // Registering again does not bring the marker back.
        registration::register(db.pool(), 999).await.unwrap();
        assert_eq!(registration::count_registrations(db.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_ignored() {
        let db = test_db().await;

        assert!(registration::add_selector(db.pool(), 999, "12345").await.unwrap());
        assert!(!registration::add_selector(db.pool(), 999, "12345").await.unwrap());
        assert_eq!(registration::count_registrations(db.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_selector_is_noop() {
        let db = test_db().await;
        registration::add_selector(db.pool(), 999, "12345").await.unwrap();

        let removed = registration::remove_selector(db.pool(), 999, "54321").await.unwrap();
        assert!(!removed);
        assert_eq!(registration::count_registrations(db.pool()).await.unwrap(), 1);

        let removed = registration::remove_selector(db.pool(), 999, "12345").await.unwrap();
        assert!(removed);
        let rows = registration::list_registrations(db.pool()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_marker());
    }

    #[tokio::test]
    async fn test_remove_from_unknown_conversation_registers_nothing() {
        let db = test_db().await;

        assert!(!registration::remove_selector(db.pool(), 999, "12345").await.unwrap());
        assert!(!registration::is_registered(db.pool(), 999).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_keeps_other_selectors() {
        let db = test_db().await;
        registration::add_selector(db.pool(), 999, "12345").await.unwrap();
        registration::add_selector(db.pool(), 999, "67890").await.unwrap();

        registration::remove_selector(db.pool(), 999, "12345").await.unwrap();

        let rows = registration::list_registrations(db.pool()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].selector, "67890");
    }

    #[tokio::test]
    async fn test_lookups_skip_marker() {
        let db = test_db().await;
        registration::register(db.pool(), 1).await.unwrap();
        registration::add_selector(db.pool(), 2, "g1").await.unwrap();
        registration::add_selector(db.pool(), 3, "g1").await.unwrap();
        registration::add_selector(db.pool(), 3, "c9").await.unwrap();

        assert_eq!(
            registration::matching_conversations(db.pool(), "g1").await.unwrap(),
            vec![2, 3]
        );
        assert!(registration::matching_conversations(db.pool(), REGISTERED_MARKER)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            registration::all_selectors(db.pool()).await.unwrap(),
            vec!["c9".to_string(), "g1".to_string()]
        );
        assert_eq!(registration::conversations(db.pool()).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_subscription_store_impl() {
        let db = test_db().await;
        let chat = ConversationId::new(-100200);
        let selector = Selector::new("12345");

        assert!(!db.is_registered(chat).await.unwrap());
        db.add_selector(chat, &selector).await.unwrap();
        assert!(db.is_registered(chat).await.unwrap());

        assert_eq!(
            db.matching_conversations(&selector).await.unwrap(),
            BTreeSet::from([chat])
        );
        assert_eq!(db.all_selectors().await.unwrap(), BTreeSet::from([selector.clone()]));

        db.remove_selector(chat, &selector).await.unwrap();
        assert!(db.is_registered(chat).await.unwrap());
        assert_eq!(db.conversations().await.unwrap(), BTreeSet::from([chat]));
        assert!(db.matching_conversations(&selector).await.unwrap().is_empty());
        assert!(db.all_selectors().await.unwrap().is_empty());
        assert_eq!(db.name(), "sqlite");
    }

    #[tokio::test]
    async fn test_closed_pool_surfaces_error() {
        let db = test_db().await;
        db.close().await;

        let result = db.is_registered(ConversationId::new(1)).await;
        assert!(matches!(result, Err(StoreError::Closed)));
    }
}
