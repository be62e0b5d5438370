//! Snapshot table rows.

use runetrack_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `player_snapshots` table.
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRow {
    pub id: DbId,
    pub player_id: DbId,
    pub created_at: Timestamp,
    pub total_level: i32,
    pub total_xp: i64,
    pub combat_level: i32,
}

/// A row from the `skill_snapshots` table.
#[derive(Debug, Clone, FromRow)]
pub struct SkillSnapshotRow {
    pub snapshot_id: DbId,
    pub skill: String,
    pub level: i32,
    pub xp: i64,
    pub rank: Option<i64>,
}

/// A row from the `boss_snapshots` table.
#[derive(Debug, Clone, FromRow)]
pub struct BossSnapshotRow {
    pub snapshot_id: DbId,
    pub boss: String,
    pub kill_count: i64,
    pub rank: Option<i64>,
}
