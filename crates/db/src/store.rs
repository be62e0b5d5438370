//! The `PlayerStore` capability trait.
//!
//! Services talk to persistence only through [`PlayerStore`]. Which
//! implementation backs it is decided once at startup: [`PgStore`] when a
//! database is configured, [`UnavailableStore`] otherwise.
//!
//! [`PgStore`]: crate::pg_store::PgStore
//! [`UnavailableStore`]: crate::unavailable::UnavailableStore

use async_trait::async_trait;
use runetrack_core::error::CoreError;
use runetrack_core::snapshot::{SnapshotPolicy, StatSnapshot};
use runetrack_core::stats::PlayerStats;
use runetrack_core::types::{DbId, Timestamp};
use serde::Serialize;

use crate::models::name_change::NameChange;
use crate::models::player::TrackedPlayer;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Persistence is not configured")]
    Unavailable,

    #[error("Player not found: {0}")]
    NotFound(String),

    #[error("Store state corrupt: {0}")]
    Corrupt(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => CoreError::Unavailable(err.to_string()),
            StoreError::NotFound(key) => CoreError::NotFound {
                entity: "Player",
                key,
            },
            StoreError::Database(_) | StoreError::Corrupt(_) => CoreError::Internal(err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// SaveOutcome
// ---------------------------------------------------------------------------

/// What a call to [`PlayerStore::save_player`] did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SaveOutcome {
    /// The player row was upserted and a new snapshot appended.
    Created {
        player_id: DbId,
        snapshot_id: DbId,
        created_at: Timestamp,
    },
    /// The player row was upserted; the last snapshot is still within the
    /// cooldown.
    Cooldown {
        player_id: DbId,
        last_snapshot_at: Timestamp,
    },
    /// Nothing was written.
    Unavailable,
}

impl SaveOutcome {
    pub fn player_id(&self) -> Option<DbId> {
        match self {
            SaveOutcome::Created { player_id, .. } | SaveOutcome::Cooldown { player_id, .. } => {
                Some(*player_id)
            }
            SaveOutcome::Unavailable => None,
        }
    }

    pub fn snapshot_created(&self) -> bool {
        matches!(self, SaveOutcome::Created { .. })
    }
}

// ---------------------------------------------------------------------------
// PlayerStore
// ---------------------------------------------------------------------------

/// Persistence of tracked players, their snapshot history and renames.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Whether this store persists anything at all.
    fn is_available(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Upsert the player's current row and, when `policy` says a snapshot is
    /// due, append one. Both happen in one transaction.
    async fn save_player(
        &self,
        stats: &PlayerStats,
        policy: SnapshotPolicy,
        now: Timestamp,
    ) -> Result<SaveOutcome, StoreError>;

    /// Look a tracked player up by username (normalised).
    async fn find_player(&self, username: &str) -> Result<Option<TrackedPlayer>, StoreError>;

    /// Every snapshot of the player, oldest first.
    async fn snapshot_history(&self, player_id: DbId) -> Result<Vec<StatSnapshot>, StoreError>;

    async fn latest_snapshot(&self, player_id: DbId) -> Result<Option<StatSnapshot>, StoreError>;

    /// Merge the old player into the row for `new_stats.username`.
    ///
    /// In one transaction: upsert the new player with `new_stats`, move all
    /// snapshots and earlier renames over, delete the old row and record a
    /// validated [`NameChange`].
    async fn apply_name_change(
        &self,
        old_player_id: DbId,
        new_stats: &PlayerStats,
        now: Timestamp,
    ) -> Result<NameChange, StoreError>;

    /// Renames recorded against the player, newest first.
    async fn name_changes(&self, player_id: DbId) -> Result<Vec<NameChange>, StoreError>;
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn store_errors_map_to_core_errors() {
        assert_matches!(CoreError::from(StoreError::Unavailable), CoreError::Unavailable(_));
        assert_matches!(
            CoreError::from(StoreError::NotFound("zezima".into())),
            CoreError::NotFound { entity: "Player", .. }
        );
        assert_matches!(
            CoreError::from(StoreError::Database(sqlx::Error::RowNotFound)),
            CoreError::Internal(_)
        );
    }

    #[test]
    fn save_outcome_serializes_with_status_tag() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_value(SaveOutcome::Cooldown {
            player_id: 3,
            last_snapshot_at: at,
        })
        .unwrap();
        assert_eq!(json["status"], "cooldown");
        assert_eq!(json["playerId"], 3);
        assert!(json["lastSnapshotAt"].is_string());

        let json = serde_json::to_value(SaveOutcome::Unavailable).unwrap();
        assert_eq!(json, serde_json::json!({"status": "unavailable"}));
    }
}
