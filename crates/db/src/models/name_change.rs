//! Name change entity model.

use runetrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `player_name_changes` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameChange {
    pub id: DbId,
    /// The player the rename was merged into.
    pub player_id: DbId,
    pub old_username: String,
    pub new_username: String,
    pub validated: bool,
    pub created_at: Timestamp,
}
