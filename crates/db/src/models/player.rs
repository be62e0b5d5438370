//! Player entity model and current stat rows.

use std::collections::BTreeMap;

use runetrack_core::skills::Skill;
use runetrack_core::stats::{AccountType, BossStats, PlayerStats, SkillStats};
use runetrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `players` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: DbId,
    /// Display form as last seen on the hiscores.
    pub username: String,
    /// Normalised form used for lookups; unique.
    #[serde(skip)]
    pub username_key: String,
    pub account_type: String,
    pub total_level: i32,
    pub total_xp: i64,
    pub combat_level: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `player_skills` table.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerSkillRow {
    pub player_id: DbId,
    pub skill: String,
    pub level: i32,
    pub xp: i64,
    pub rank: Option<i64>,
}

/// A row from the `player_bosses` table.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerBossRow {
    pub player_id: DbId,
    pub boss: String,
    pub kill_count: i64,
    pub rank: Option<i64>,
}

/// A player row together with the stats it last recorded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPlayer {
    pub player: Player,
    pub stats: PlayerStats,
}

impl TrackedPlayer {
    /// Rebuild the recorded stat sheet from the current-stat rows.
    ///
    /// Rows naming an unknown skill are skipped with a warning.
    pub fn from_rows(player: Player, skills: Vec<PlayerSkillRow>, bosses: Vec<PlayerBossRow>) -> Self {
        let mut skill_map = BTreeMap::new();
        for row in skills {
            match row.skill.parse::<Skill>() {
                Ok(skill) => {
                    skill_map.insert(
                        skill,
                        SkillStats {
                            level: row.level,
                            xp: row.xp,
                            rank: row.rank,
                        },
                    );
                }
                Err(_) => {
                    tracing::warn!(player_id = player.id, skill = %row.skill, "Skipping unknown skill row");
                }
            }
        }
        let boss_map = bosses
            .into_iter()
            .map(|row| {
                (
                    row.boss,
                    BossStats {
                        kill_count: row.kill_count,
                        rank: row.rank,
                    },
                )
            })
            .collect();
        let account_type = player.account_type.parse().unwrap_or(AccountType::Normal);
        let stats = PlayerStats::new(
            player.username.clone(),
            account_type,
            Some(player.total_xp),
            skill_map,
            boss_map,
        );
        Self { player, stats }
    }
}
