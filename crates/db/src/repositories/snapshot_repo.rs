//! Repository for the `player_snapshots`, `skill_snapshots` and
//! `boss_snapshots` tables.

use std::collections::HashMap;

use runetrack_core::skills::Skill;
use runetrack_core::snapshot::{BossSnapshot, SkillSnapshot, StatSnapshot};
use runetrack_core::stats::PlayerStats;
use runetrack_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::snapshot::{BossSnapshotRow, SkillSnapshotRow, SnapshotRow};

const COLUMNS: &str = "id, player_id, created_at, total_level, total_xp, combat_level";

/// Provides query operations for stat snapshots.
pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Creation time of the most recent snapshot of a player.
    pub async fn latest_created_at(
        conn: &mut PgConnection,
        player_id: DbId,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Timestamp>(
            "SELECT created_at FROM player_snapshots \
             WHERE player_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(player_id)
        .fetch_optional(conn)
        .await
    }

    /// Insert a snapshot of `stats` with its skill and boss rows.
    pub async fn insert(
        conn: &mut PgConnection,
        player_id: DbId,
        stats: &PlayerStats,
        now: Timestamp,
    ) -> Result<SnapshotRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO player_snapshots \
                (player_id, created_at, total_level, total_xp, combat_level) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SnapshotRow>(&query)
            .bind(player_id)
            .bind(now)
            .bind(stats.total_level)
            .bind(stats.total_xp)
            .bind(stats.combat_level)
            .fetch_one(&mut *conn)
            .await?;

        for (skill, s) in &stats.skills {
            sqlx::query(
                "INSERT INTO skill_snapshots (snapshot_id, skill, level, xp, rank) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(row.id)
            .bind(skill.key())
            .bind(s.level)
            .bind(s.xp)
            .bind(s.rank)
            .execute(&mut *conn)
            .await?;
        }

        for (boss, b) in stats.bosses.iter().filter(|(_, b)| b.kill_count > 0) {
            sqlx::query(
                "INSERT INTO boss_snapshots (snapshot_id, boss, kill_count, rank) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(row.id)
            .bind(boss)
            .bind(b.kill_count)
            .bind(b.rank)
            .execute(&mut *conn)
            .await?;
        }

        Ok(row)
    }

    /// All snapshots of a player, oldest first.
    pub async fn list_for_player(pool: &PgPool, player_id: DbId) -> Result<Vec<StatSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM player_snapshots \
             WHERE player_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, SnapshotRow>(&query)
            .bind(player_id)
            .fetch_all(pool)
            .await?;

        let skills = sqlx::query_as::<_, SkillSnapshotRow>(
            "SELECT s.snapshot_id, s.skill, s.level, s.xp, s.rank \
             FROM skill_snapshots s \
             JOIN player_snapshots p ON p.id = s.snapshot_id \
             WHERE p.player_id = $1",
        )
        .bind(player_id)
        .fetch_all(pool)
        .await?;

        let bosses = sqlx::query_as::<_, BossSnapshotRow>(
            "SELECT b.snapshot_id, b.boss, b.kill_count, b.rank \
             FROM boss_snapshots b \
             JOIN player_snapshots p ON p.id = b.snapshot_id \
             WHERE p.player_id = $1",
        )
        .bind(player_id)
        .fetch_all(pool)
        .await?;

        Ok(assemble(rows, skills, bosses))
    }

    /// Most recent snapshot of a player.
    pub async fn latest(pool: &PgPool, player_id: DbId) -> Result<Option<StatSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM player_snapshots \
             WHERE player_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        let Some(row) = sqlx::query_as::<_, SnapshotRow>(&query)
            .bind(player_id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let skills = sqlx::query_as::<_, SkillSnapshotRow>(
            "SELECT snapshot_id, skill, level, xp, rank FROM skill_snapshots WHERE snapshot_id = $1",
        )
        .bind(row.id)
        .fetch_all(pool)
        .await?;
        let bosses = sqlx::query_as::<_, BossSnapshotRow>(
            "SELECT snapshot_id, boss, kill_count, rank FROM boss_snapshots WHERE snapshot_id = $1",
        )
        .bind(row.id)
        .fetch_all(pool)
        .await?;

        Ok(assemble(vec![row], skills, bosses).pop())
    }

    /// Move every snapshot of `from` onto `to`. Returns the number moved.
    pub async fn reassign(conn: &mut PgConnection, from: DbId, to: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE player_snapshots SET player_id = $2 WHERE player_id = $1")
            .bind(from)
            .bind(to)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Group child rows under their snapshots, preserving snapshot order.
/// Child rows naming an unknown skill are dropped.
fn assemble(
    rows: Vec<SnapshotRow>,
    skills: Vec<SkillSnapshotRow>,
    bosses: Vec<BossSnapshotRow>,
) -> Vec<StatSnapshot> {
    let mut skills_by_id: HashMap<DbId, Vec<SkillSnapshot>> = HashMap::new();
    for row in skills {
        let Ok(skill) = row.skill.parse::<Skill>() else {
            tracing::warn!(snapshot_id = row.snapshot_id, skill = %row.skill, "Skipping unknown skill row");
            continue;
        };
        skills_by_id.entry(row.snapshot_id).or_default().push(SkillSnapshot {
            skill,
            level: row.level,
            xp: row.xp,
            rank: row.rank,
        });
    }

    let mut bosses_by_id: HashMap<DbId, Vec<BossSnapshot>> = HashMap::new();
    for row in bosses {
        bosses_by_id.entry(row.snapshot_id).or_default().push(BossSnapshot {
            boss: row.boss,
            kill_count: row.kill_count,
            rank: row.rank,
        });
    }

    rows.into_iter()
        .map(|row| {
            let mut skills = skills_by_id.remove(&row.id).unwrap_or_default();
            skills.sort_by_key(|s| s.skill);
            let mut bosses = bosses_by_id.remove(&row.id).unwrap_or_default();
            bosses.sort_by(|a, b| a.boss.cmp(&b.boss));
            StatSnapshot {
                id: row.id,
                player_id: row.player_id,
                created_at: row.created_at,
                total_level: row.total_level,
                total_xp: row.total_xp,
                combat_level: row.combat_level,
                skills,
                bosses,
            }
        })
        .collect()
}
