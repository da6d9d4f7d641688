//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Selector value stored for a conversation that is registered but has not
/// added any selector yet. Command tokens are never empty, so it cannot
/// collide with a user-supplied selector.
pub const REGISTERED_MARKER: &str = "";

/// A single row of the registrations table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Registration {
    /// Telegram chat id.
    pub conversation_id: i64,
    /// Discord channel or guild id, or [`REGISTERED_MARKER`].
    pub selector: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl Registration {
    /// Whether this row only marks the conversation as registered.
    pub fn is_marker(&self) -> bool {
        self.selector == REGISTERED_MARKER
    }
}
