//! Point-in-time stat snapshots and the snapshot cadence rule.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::skills::Skill;
use crate::stats::PlayerStats;
use crate::types::{DbId, Timestamp};

/// Default minimum spacing between two snapshots of the same player.
pub const DEFAULT_SNAPSHOT_COOLDOWN_MINS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSnapshot {
    pub skill: Skill,
    pub level: i32,
    pub xp: i64,
    pub rank: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossSnapshot {
    pub boss: String,
    pub kill_count: i64,
    pub rank: Option<i64>,
}

/// An immutable record of a player's stats at `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSnapshot {
    pub id: DbId,
    pub player_id: DbId,
    pub created_at: Timestamp,
    pub total_level: i32,
    pub total_xp: i64,
    pub combat_level: i32,
    pub skills: Vec<SkillSnapshot>,
    pub bosses: Vec<BossSnapshot>,
}

impl StatSnapshot {
    /// Capture `stats` as a snapshot row. Bosses with no kills are omitted.
    pub fn capture(id: DbId, player_id: DbId, stats: &PlayerStats, created_at: Timestamp) -> Self {
        Self {
            id,
            player_id,
            created_at,
            total_level: stats.total_level,
            total_xp: stats.total_xp,
            combat_level: stats.combat_level,
            skills: stats
                .skills
                .iter()
                .map(|(&skill, s)| SkillSnapshot {
                    skill,
                    level: s.level,
                    xp: s.xp,
                    rank: s.rank,
                })
                .collect(),
            bosses: stats
                .bosses
                .iter()
                .filter(|(_, b)| b.kill_count > 0)
                .map(|(name, b)| BossSnapshot {
                    boss: name.clone(),
                    kill_count: b.kill_count,
                    rank: b.rank,
                })
                .collect(),
        }
    }

    /// Level recorded for `skill`; skills absent from the snapshot count as 1.
    pub fn skill_level(&self, skill: Skill) -> i32 {
        self.skills
            .iter()
            .find(|s| s.skill == skill)
            .map_or(1, |s| s.level)
    }

    /// Lowest recorded level across all 24 skills.
    pub fn min_skill_level(&self) -> i32 {
        Skill::ALL
            .iter()
            .map(|&skill| self.skill_level(skill))
            .min()
            .unwrap_or(1)
    }

    pub fn boss_kc(&self, boss: &str) -> i64 {
        self.bosses
            .iter()
            .find(|b| b.boss == boss)
            .map_or(0, |b| b.kill_count)
    }
}

/// When a save should append a new snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotPolicy {
    /// Insert regardless of the cooldown.
    pub force: bool,
    pub cooldown: Duration,
}

impl SnapshotPolicy {
    pub fn new(force: bool, cooldown_mins: i64) -> Self {
        Self {
            force,
            cooldown: Duration::minutes(cooldown_mins),
        }
    }

    /// Whether a snapshot is due given the most recent one.
    ///
    /// The check is a best-effort timestamp gate: two concurrent saves may
    /// both see the same `last` and both insert.
    pub fn is_due(&self, last: Option<Timestamp>, now: Timestamp) -> bool {
        match last {
            _ if self.force => true,
            None => true,
            Some(last) => now - last >= self.cooldown,
        }
    }
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self::new(false, DEFAULT_SNAPSHOT_COOLDOWN_MINS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32, min: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, min, 0).unwrap()
    }

    #[test]
    fn first_snapshot_is_always_due() {
        assert!(SnapshotPolicy::default().is_due(None, at(10, 0)));
    }

    #[test]
    fn cooldown_blocks_within_the_hour() {
        let policy = SnapshotPolicy::default();
        assert!(!policy.is_due(Some(at(10, 0)), at(10, 59)));
        assert!(policy.is_due(Some(at(10, 0)), at(11, 0)));
    }

    #[test]
    fn force_ignores_cooldown() {
        let policy = SnapshotPolicy::new(true, 60);
        assert!(policy.is_due(Some(at(10, 0)), at(10, 1)));
    }

    #[test]
    fn missing_skills_read_as_level_one() {
        let snapshot = StatSnapshot {
            id: 1,
            player_id: 1,
            created_at: at(1, 0),
            total_level: 0,
            total_xp: 0,
            combat_level: 3,
            skills: vec![SkillSnapshot {
                skill: Skill::Attack,
                level: 60,
                xp: 273_742,
                rank: None,
            }],
            bosses: vec![],
        };
        assert_eq!(snapshot.skill_level(Skill::Attack), 60);
        assert_eq!(snapshot.skill_level(Skill::Sailing), 1);
        assert_eq!(snapshot.min_skill_level(), 1);
        assert_eq!(snapshot.boss_kc("Zulrah"), 0);
    }
}
