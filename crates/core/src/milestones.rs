//! Milestone engine.
//!
//! Derives the fixed milestone set from a player's current stats. Milestones
//! are computed on demand and never persisted; [`crate::achievements`] fills
//! in when each achieved milestone was first reached.

use std::cmp::Ordering;

use serde::Serialize;

use crate::skills::{Skill, MAX_LEVEL};
use crate::stats::{PlayerStats, MAX_TOTAL_LEVEL};
use crate::types::Timestamp;

pub const BASE_LEVEL_THRESHOLDS: [i32; 10] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 99];

pub const TOTAL_LEVEL_THRESHOLDS: [i32; 12] = [
    500, 750, 1000, 1250, 1500, 1750, 1900, 2000, 2100, 2200, 2300, 2376,
];

pub const COMBAT_LEVEL_THRESHOLDS: [i32; 7] = [50, 70, 90, 100, 110, 120, 126];

pub const BOSS_KC_THRESHOLDS: [i64; 11] = [1, 10, 25, 50, 100, 250, 500, 1000, 2500, 5000, 10000];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Achieved,
    InProgress,
}

/// What a milestone measures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MilestoneKind {
    #[serde(rename = "skill_99")]
    Skill99 { skill: Skill },
    /// Every skill at or above `level`.
    BaseLevel { level: i32 },
    TotalLevel { level: i32 },
    BossKc { boss: String, kills: i64 },
    CombatLevel { level: i32 },
    MaxCape,
}

impl MilestoneKind {
    /// Stable identifier, e.g. `boss_kc:zulrah:100`.
    pub fn id(&self) -> String {
        match self {
            MilestoneKind::Skill99 { skill } => format!("skill_99:{}", skill.key()),
            MilestoneKind::BaseLevel { level } => format!("base_level:{level}"),
            MilestoneKind::TotalLevel { level } => format!("total_level:{level}"),
            MilestoneKind::BossKc { boss, kills } => {
                format!("boss_kc:{}:{kills}", boss.to_ascii_lowercase().replace(' ', "_"))
            }
            MilestoneKind::CombatLevel { level } => format!("combat_level:{level}"),
            MilestoneKind::MaxCape => "max_cape".to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            MilestoneKind::Skill99 { skill } => format!("99 {skill}"),
            MilestoneKind::BaseLevel { level } => format!("Base {level}s"),
            MilestoneKind::TotalLevel { level } => format!("{level} total level"),
            MilestoneKind::BossKc { boss, kills } if *kills == 1 => format!("First {boss} kill"),
            MilestoneKind::BossKc { boss, kills } => format!("{kills} {boss} kills"),
            MilestoneKind::CombatLevel { level } => format!("Combat level {level}"),
            MilestoneKind::MaxCape => "Max cape".to_string(),
        }
    }
}

/// A threshold with the player's progress towards it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: MilestoneKind,
    pub current: i64,
    pub target: i64,
    pub status: MilestoneStatus,
    /// Percentage in `[0, 100]`.
    pub progress: f64,
    /// First snapshot in which the milestone was met, when known.
    pub achieved_at: Option<Timestamp>,
}

impl Milestone {
    pub fn new(kind: MilestoneKind, current: i64, target: i64) -> Self {
        let status = if current >= target {
            MilestoneStatus::Achieved
        } else {
            MilestoneStatus::InProgress
        };
        Self {
            id: kind.id(),
            label: kind.label(),
            kind,
            current,
            target,
            status,
            progress: progress(current, target),
            achieved_at: None,
        }
    }

    pub fn is_achieved(&self) -> bool {
        self.status == MilestoneStatus::Achieved
    }
}

/// `min(current / target * 100, 100)`, never negative.
pub fn progress(current: i64, target: i64) -> f64 {
    if target <= 0 {
        return 100.0;
    }
    (current as f64 / target as f64 * 100.0).clamp(0.0, 100.0)
}

/// Compute every milestone for `stats`.
///
/// Produces 24 skill-99 rows, the base, total and combat level ladders, one
/// max-cape row and the boss ladder for each boss with at least one kill.
pub fn compute_milestones(stats: &PlayerStats) -> Vec<Milestone> {
    let mut out = Vec::with_capacity(
        Skill::ALL.len()
            + BASE_LEVEL_THRESHOLDS.len()
            + TOTAL_LEVEL_THRESHOLDS.len()
            + COMBAT_LEVEL_THRESHOLDS.len()
            + 1
            + stats.bosses.len() * BOSS_KC_THRESHOLDS.len(),
    );

    for skill in Skill::ALL {
        out.push(Milestone::new(
            MilestoneKind::Skill99 { skill },
            i64::from(stats.skill_level(skill).min(MAX_LEVEL)),
            i64::from(MAX_LEVEL),
        ));
    }

    let lowest = i64::from(stats.min_skill_level());
    for level in BASE_LEVEL_THRESHOLDS {
        out.push(Milestone::new(
            MilestoneKind::BaseLevel { level },
            lowest,
            i64::from(level),
        ));
    }

    for level in TOTAL_LEVEL_THRESHOLDS {
        out.push(Milestone::new(
            MilestoneKind::TotalLevel { level },
            i64::from(stats.total_level),
            i64::from(level),
        ));
    }

    for level in COMBAT_LEVEL_THRESHOLDS {
        out.push(Milestone::new(
            MilestoneKind::CombatLevel { level },
            i64::from(stats.combat_level),
            i64::from(level),
        ));
    }

    out.push(Milestone::new(
        MilestoneKind::MaxCape,
        i64::from(stats.total_level),
        i64::from(MAX_TOTAL_LEVEL),
    ));

    for (boss, boss_stats) in &stats.bosses {
        if boss_stats.kill_count <= 0 {
            continue;
        }
        for kills in BOSS_KC_THRESHOLDS {
            out.push(Milestone::new(
                MilestoneKind::BossKc {
                    boss: boss.clone(),
                    kills,
                },
                boss_stats.kill_count,
                kills,
            ));
        }
    }

    out
}

/// The `n` unfinished 99s closest to completion, best first.
pub fn nearest_99s(milestones: &[Milestone], n: usize) -> Vec<Milestone> {
    let mut candidates: Vec<&Milestone> = milestones
        .iter()
        .filter(|m| matches!(m.kind, MilestoneKind::Skill99 { .. }) && !m.is_achieved())
        .collect();
    candidates.sort_by(|a, b| {
        b.progress
            .partial_cmp(&a.progress)
            .unwrap_or(Ordering::Equal)
    });
    candidates.into_iter().take(n).cloned().collect()
}

/// Achieved/in-progress counts over a milestone set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneSummary {
    pub achieved: usize,
    pub in_progress: usize,
    pub total: usize,
}

pub fn summarize(milestones: &[Milestone]) -> MilestoneSummary {
    let achieved = milestones.iter().filter(|m| m.is_achieved()).count();
    MilestoneSummary {
        achieved,
        in_progress: milestones.len() - achieved,
        total: milestones.len(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::experience::xp_for_level;
    use crate::stats::{AccountType, BossStats, SkillStats};

    fn stats_with(levels: impl Fn(Skill) -> i32, bosses: &[(&str, i64)]) -> PlayerStats {
        let skills = Skill::ALL
            .iter()
            .map(|&skill| {
                let level = levels(skill);
                (
                    skill,
                    SkillStats {
                        level,
                        xp: xp_for_level(level),
                        rank: None,
                    },
                )
            })
            .collect();
        let bosses = bosses
            .iter()
            .map(|&(name, kc)| {
                (
                    name.to_string(),
                    BossStats {
                        kill_count: kc,
                        rank: None,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();
        PlayerStats::new("Tester", AccountType::Normal, None, skills, bosses)
    }

    fn find<'a>(milestones: &'a [Milestone], id: &str) -> &'a Milestone {
        milestones
            .iter()
            .find(|m| m.id == id)
            .unwrap_or_else(|| panic!("milestone {id} missing"))
    }

    #[test]
    fn fixed_set_without_bosses() {
        let milestones = compute_milestones(&stats_with(|_| 50, &[]));
        assert_eq!(milestones.len(), 24 + 10 + 12 + 7 + 1);
    }

    #[test]
    fn boss_rows_only_for_bosses_with_kills() {
        let milestones = compute_milestones(&stats_with(|_| 50, &[("Zulrah", 120), ("Obor", 0)]));
        assert_eq!(milestones.len(), 24 + 10 + 12 + 7 + 1 + 11);
        let hundred = find(&milestones, "boss_kc:zulrah:100");
        assert!(hundred.is_achieved());
        let two_fifty = find(&milestones, "boss_kc:zulrah:250");
        assert_eq!(two_fifty.status, MilestoneStatus::InProgress);
        assert!((two_fifty.progress - 48.0).abs() < 1e-9);
        assert!(milestones.iter().all(|m| !m.id.contains("obor")));
    }

    #[test]
    fn level_99_skill_is_achieved_at_full_progress() {
        let milestones =
            compute_milestones(&stats_with(|s| if s == Skill::Cooking { 99 } else { 60 }, &[]));
        let cooking = find(&milestones, "skill_99:cooking");
        assert_eq!(cooking.status, MilestoneStatus::Achieved);
        assert_eq!(cooking.progress, 100.0);
        assert_eq!(cooking.label, "99 Cooking");
    }

    #[test]
    fn base_level_uses_lowest_skill() {
        let milestones =
            compute_milestones(&stats_with(|s| if s == Skill::Agility { 10 } else { 50 }, &[]));
        let base_10 = find(&milestones, "base_level:10");
        assert_eq!(base_10.status, MilestoneStatus::Achieved);
        let base_20 = find(&milestones, "base_level:20");
        assert_eq!(base_20.status, MilestoneStatus::InProgress);
        assert_eq!(base_20.progress, 50.0);
    }

    #[test]
    fn progress_is_capped_at_100() {
        assert_eq!(progress(5000, 10), 100.0);
        assert_eq!(progress(0, 10), 0.0);
    }

    #[test]
    fn max_cape_requires_every_99() {
        let maxed = compute_milestones(&stats_with(|_| 99, &[]));
        assert!(find(&maxed, "max_cape").is_achieved());
        let almost = compute_milestones(&stats_with(|s| if s == Skill::Sailing { 98 } else { 99 }, &[]));
        assert!(!find(&almost, "max_cape").is_achieved());
        assert!(find(&almost, "total_level:2300").is_achieved());
    }

    #[test]
    fn nearest_99s_sorted_by_progress() {
        let milestones = compute_milestones(&stats_with(
            |s| match s {
                Skill::Attack => 99,
                Skill::Strength => 95,
                Skill::Defence => 90,
                _ => 40,
            },
            &[],
        ));
        let nearest = nearest_99s(&milestones, 2);
        assert_eq!(nearest.len(), 2);
        assert_eq!(nearest[0].id, "skill_99:strength");
        assert_eq!(nearest[1].id, "skill_99:defence");
    }

    #[test]
    fn summary_counts_statuses() {
        let milestones = compute_milestones(&stats_with(|_| 99, &[]));
        let summary = summarize(&milestones);
        assert_eq!(summary.total, milestones.len());
        assert_eq!(summary.in_progress, 0);
    }

    #[test]
    fn serializes_with_type_tag() {
        let milestone = Milestone::new(MilestoneKind::Skill99 { skill: Skill::Magic }, 80, 99);
        let json = serde_json::to_value(&milestone).unwrap();
        assert_eq!(json["type"], "skill_99");
        assert_eq!(json["skill"], "magic");
        assert_eq!(json["status"], "in_progress");
        assert!(json["achievedAt"].is_null());
    }
}
