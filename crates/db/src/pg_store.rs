//! Postgres-backed [`PlayerStore`].

use async_trait::async_trait;
use runetrack_core::snapshot::{SnapshotPolicy, StatSnapshot};
use runetrack_core::stats::{normalize_username, PlayerStats};
use runetrack_core::types::{DbId, Timestamp};

use crate::models::name_change::NameChange;
use crate::models::player::TrackedPlayer;
use crate::repositories::{NameChangeRepo, PlayerRepo, SnapshotRepo};
use crate::store::{PlayerStore, SaveOutcome, StoreError};
use crate::DbPool;

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerStore for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn save_player(
        &self,
        stats: &PlayerStats,
        policy: SnapshotPolicy,
        now: Timestamp,
    ) -> Result<SaveOutcome, StoreError> {
        let key = normalize_username(&stats.username);
        let mut tx = self.pool.begin().await?;

        let player = PlayerRepo::upsert(&mut tx, &key, stats, now).await?;
        PlayerRepo::replace_current_stats(&mut tx, player.id, stats).await?;

        let last = SnapshotRepo::latest_created_at(&mut tx, player.id).await?;
        let outcome = match last {
            Some(last_snapshot_at) if !policy.is_due(last, now) => SaveOutcome::Cooldown {
                player_id: player.id,
                last_snapshot_at,
            },
            _ => {
                let snapshot = SnapshotRepo::insert(&mut tx, player.id, stats, now).await?;
                SaveOutcome::Created {
                    player_id: player.id,
                    snapshot_id: snapshot.id,
                    created_at: snapshot.created_at,
                }
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn find_player(&self, username: &str) -> Result<Option<TrackedPlayer>, StoreError> {
        let Some(player) = PlayerRepo::find_by_key(&self.pool, &normalize_username(username)).await?
        else {
            return Ok(None);
        };
        let skills = PlayerRepo::current_skills(&self.pool, player.id).await?;
        let bosses = PlayerRepo::current_bosses(&self.pool, player.id).await?;
        Ok(Some(TrackedPlayer::from_rows(player, skills, bosses)))
    }

    async fn snapshot_history(&self, player_id: DbId) -> Result<Vec<StatSnapshot>, StoreError> {
        Ok(SnapshotRepo::list_for_player(&self.pool, player_id).await?)
    }

    async fn latest_snapshot(&self, player_id: DbId) -> Result<Option<StatSnapshot>, StoreError> {
        Ok(SnapshotRepo::latest(&self.pool, player_id).await?)
    }

    async fn apply_name_change(
        &self,
        old_player_id: DbId,
        new_stats: &PlayerStats,
        now: Timestamp,
    ) -> Result<NameChange, StoreError> {
        let mut tx = self.pool.begin().await?;

        let old_username: String =
            sqlx::query_scalar::<_, String>("SELECT username FROM players WHERE id = $1 FOR UPDATE")
                .bind(old_player_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| StoreError::NotFound(old_player_id.to_string()))?;

        let key = normalize_username(&new_stats.username);
        let player = PlayerRepo::upsert(&mut tx, &key, new_stats, now).await?;
        PlayerRepo::replace_current_stats(&mut tx, player.id, new_stats).await?;

        let moved = SnapshotRepo::reassign(&mut tx, old_player_id, player.id).await?;
        NameChangeRepo::reassign(&mut tx, old_player_id, player.id).await?;
        PlayerRepo::delete(&mut tx, old_player_id).await?;

        let change = NameChangeRepo::insert(
            &mut tx,
            player.id,
            &old_username,
            &new_stats.username,
            true,
            now,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            old_player_id,
            new_player_id = player.id,
            snapshots_moved = moved,
            "Merged renamed player"
        );
        Ok(change)
    }

    async fn name_changes(&self, player_id: DbId) -> Result<Vec<NameChange>, StoreError> {
        Ok(NameChangeRepo::list_for_player(&self.pool, player_id).await?)
    }
}
