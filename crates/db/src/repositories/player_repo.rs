//! Repository for the `players`, `player_skills` and `player_bosses` tables.

use runetrack_core::stats::PlayerStats;
use runetrack_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::player::{Player, PlayerBossRow, PlayerSkillRow};

/// Column list for `players` SELECT queries.
const COLUMNS: &str = "\
    id, username, username_key, account_type, \
    total_level, total_xp, combat_level, created_at, updated_at";

/// Provides query operations for tracked players.
pub struct PlayerRepo;

impl PlayerRepo {
    /// Find a player by normalised username.
    pub async fn find_by_key(pool: &PgPool, username_key: &str) -> Result<Option<Player>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM players WHERE username_key = $1");
        sqlx::query_as::<_, Player>(&query)
            .bind(username_key)
            .fetch_optional(pool)
            .await
    }

    /// Insert the player or refresh its totals, keyed by normalised username.
    pub async fn upsert(
        conn: &mut PgConnection,
        username_key: &str,
        stats: &PlayerStats,
        now: Timestamp,
    ) -> Result<Player, sqlx::Error> {
        let query = format!(
            "INSERT INTO players \
                (username, username_key, account_type, total_level, total_xp, combat_level, \
                 created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
             ON CONFLICT (username_key) DO UPDATE SET \
                username = EXCLUDED.username, \
                account_type = EXCLUDED.account_type, \
                total_level = EXCLUDED.total_level, \
                total_xp = EXCLUDED.total_xp, \
                combat_level = EXCLUDED.combat_level, \
                updated_at = EXCLUDED.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Player>(&query)
            .bind(&stats.username)
            .bind(username_key)
            .bind(stats.account_type.as_str())
            .bind(stats.total_level)
            .bind(stats.total_xp)
            .bind(stats.combat_level)
            .bind(now)
            .fetch_one(conn)
            .await
    }

    /// Replace the current skill and boss rows of a player.
    pub async fn replace_current_stats(
        conn: &mut PgConnection,
        player_id: DbId,
        stats: &PlayerStats,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM player_skills WHERE player_id = $1")
            .bind(player_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM player_bosses WHERE player_id = $1")
            .bind(player_id)
            .execute(&mut *conn)
            .await?;

        for (skill, s) in &stats.skills {
            sqlx::query(
                "INSERT INTO player_skills (player_id, skill, level, xp, rank) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(player_id)
            .bind(skill.key())
            .bind(s.level)
            .bind(s.xp)
            .bind(s.rank)
            .execute(&mut *conn)
            .await?;
        }

        for (boss, b) in stats.bosses.iter().filter(|(_, b)| b.kill_count > 0) {
            sqlx::query(
                "INSERT INTO player_bosses (player_id, boss, kill_count, rank) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(player_id)
            .bind(boss)
            .bind(b.kill_count)
            .bind(b.rank)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    pub async fn current_skills(pool: &PgPool, player_id: DbId) -> Result<Vec<PlayerSkillRow>, sqlx::Error> {
        sqlx::query_as::<_, PlayerSkillRow>(
            "SELECT player_id, skill, level, xp, rank FROM player_skills WHERE player_id = $1",
        )
        .bind(player_id)
        .fetch_all(pool)
        .await
    }

    pub async fn current_bosses(pool: &PgPool, player_id: DbId) -> Result<Vec<PlayerBossRow>, sqlx::Error> {
        sqlx::query_as::<_, PlayerBossRow>(
            "SELECT player_id, boss, kill_count, rank FROM player_bosses WHERE player_id = $1",
        )
        .bind(player_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a player. Current stat rows cascade.
    pub async fn delete(conn: &mut PgConnection, player_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(player_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
