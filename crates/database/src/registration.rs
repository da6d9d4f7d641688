//! Registration CRUD operations.

use sqlx::SqlitePool;

use crate::models::{Registration, REGISTERED_MARKER};
use crate::Result;

/// Check if a conversation has any registration row, marker included.
pub async fn is_registered(pool: &SqlitePool, conversation_id: i64) -> Result<bool> {
    let result = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT 1
        FROM registrations
        WHERE conversation_id = ?
        LIMIT 1
        "#,
    )
    .bind(conversation_id)
    .fetch_optional(pool)
    .await?;

    Ok(result.is_some())
}

/// Insert the registration marker if the conversation has no rows yet.
///
/// Returns whether a row was written.
pub async fn register(pool: &SqlitePool, conversation_id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO registrations (conversation_id, selector)
        SELECT ?, ?
        WHERE NOT EXISTS (
            SELECT 1 FROM registrations WHERE conversation_id = ?
        )
        "#,
    )
    .bind(conversation_id)
    .bind(REGISTERED_MARKER)
    .bind(conversation_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Add a selector for a conversation, replacing its registration marker.
///
/// Adding an existing selector is a no-op. Returns whether a new row was
/// written.
pub async fn add_selector(pool: &SqlitePool, conversation_id: i64, selector: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT OR IGNORE INTO registrations (conversation_id, selector)
        VALUES (?, ?)
        "#,
    )
    .bind(conversation_id)
    .bind(selector)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query(
        r#"
        DELETE FROM registrations
        WHERE conversation_id = ? AND selector = ?
        "#,
    )
    .bind(conversation_id)
    .bind(REGISTERED_MARKER)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(inserted > 0)
}

/// Remove a selector from a conversation.
///
/// Removing a selector that was never added is a no-op. When the last real
/// selector goes, the registration marker is written back so the
/// conversation stays registered. Returns whether a row was deleted.
pub async fn remove_selector(
    pool: &SqlitePool,
    conversation_id: i64,
    selector: &str,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query(
        r#"
        DELETE FROM registrations
        WHERE conversation_id = ? AND selector = ?
        "#,
    )
    .bind(conversation_id)
    .bind(selector)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if removed > 0 {
        sqlx::query(
            r#"
            INSERT INTO registrations (conversation_id, selector)
            SELECT ?, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM registrations WHERE conversation_id = ?
            )
            "#,
        )
        .bind(conversation_id)
        .bind(REGISTERED_MARKER)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(removed > 0)
}

/// Get all conversations holding a selector.
pub async fn matching_conversations(pool: &SqlitePool, selector: &str) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT conversation_id
        FROM registrations
        WHERE selector = ? AND selector <> ?
        ORDER BY conversation_id
        "#,
    )
    .bind(selector)
    .bind(REGISTERED_MARKER)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Get every distinct selector, excluding registration markers.
pub async fn all_selectors(pool: &SqlitePool) -> Result<Vec<String>> {
    let selectors = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT selector
        FROM registrations
        WHERE selector <> ?
        ORDER BY selector
        "#,
    )
    .bind(REGISTERED_MARKER)
    .fetch_all(pool)
    .await?;

    Ok(selectors)
}

/// Get every registered conversation.
pub async fn conversations(pool: &SqlitePool) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT DISTINCT conversation_id
        FROM registrations
        ORDER BY conversation_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// List all registration rows.
pub async fn list_registrations(pool: &SqlitePool) -> Result<Vec<Registration>> {
    let rows = sqlx::query_as::<_, Registration>(
        r#"
        SELECT conversation_id, selector, created_at
        FROM registrations
        ORDER BY conversation_id, selector
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count all registration rows.
pub async fn count_registrations(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM registrations
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
