//! Null-object [`PlayerStore`] used when no database is configured.
//!
//! Saves are skipped and reads fail with [`StoreError::Unavailable`], so the
//! API degrades to live lookups without history.

use async_trait::async_trait;
use runetrack_core::snapshot::{SnapshotPolicy, StatSnapshot};
use runetrack_core::stats::PlayerStats;
use runetrack_core::types::{DbId, Timestamp};

use crate::models::name_change::NameChange;
use crate::models::player::TrackedPlayer;
use crate::store::{PlayerStore, SaveOutcome, StoreError};

#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

#[async_trait]
impl PlayerStore for UnavailableStore {
    fn is_available(&self) -> bool {
        false
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn save_player(
        &self,
        stats: &PlayerStats,
        _policy: SnapshotPolicy,
        _now: Timestamp,
    ) -> Result<SaveOutcome, StoreError> {
        tracing::debug!(username = %stats.username, "Persistence unavailable, skipping save");
        Ok(SaveOutcome::Unavailable)
    }

    async fn find_player(&self, _username: &str) -> Result<Option<TrackedPlayer>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn snapshot_history(&self, _player_id: DbId) -> Result<Vec<StatSnapshot>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn latest_snapshot(&self, _player_id: DbId) -> Result<Option<StatSnapshot>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn apply_name_change(
        &self,
        _old_player_id: DbId,
        _new_stats: &PlayerStats,
        _now: Timestamp,
    ) -> Result<NameChange, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn name_changes(&self, _player_id: DbId) -> Result<Vec<NameChange>, StoreError> {
        Err(StoreError::Unavailable)
    }
}
