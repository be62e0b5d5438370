//! Repository for the `player_name_changes` table.

use runetrack_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::name_change::NameChange;

const COLUMNS: &str = "id, player_id, old_username, new_username, validated, created_at";

/// Provides query operations for recorded renames.
pub struct NameChangeRepo;

impl NameChangeRepo {
    pub async fn insert(
        conn: &mut PgConnection,
        player_id: DbId,
        old_username: &str,
        new_username: &str,
        validated: bool,
        now: Timestamp,
    ) -> Result<NameChange, sqlx::Error> {
        let query = format!(
            "INSERT INTO player_name_changes \
                (player_id, old_username, new_username, validated, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NameChange>(&query)
            .bind(player_id)
            .bind(old_username)
            .bind(new_username)
            .bind(validated)
            .bind(now)
            .fetch_one(conn)
            .await
    }

    /// Renames of a player, newest first.
    pub async fn list_for_player(pool: &PgPool, player_id: DbId) -> Result<Vec<NameChange>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM player_name_changes \
             WHERE player_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, NameChange>(&query)
            .bind(player_id)
            .fetch_all(pool)
            .await
    }

    pub async fn reassign(conn: &mut PgConnection, from: DbId, to: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE player_name_changes SET player_id = $2 WHERE player_id = $1")
            .bind(from)
            .bind(to)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
