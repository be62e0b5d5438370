//! Achievement date resolution.
//!
//! For each achieved milestone, finds the earliest snapshot in which the
//! milestone's condition already held.

use crate::milestones::{Milestone, MilestoneKind};
use crate::skills::{Skill, MAX_LEVEL};
use crate::snapshot::StatSnapshot;
use crate::stats::MAX_TOTAL_LEVEL;
use crate::types::Timestamp;

/// Whether the milestone condition holds for a historical snapshot.
///
/// Mirrors the achieved check of the milestone engine, evaluated against the
/// snapshot's recorded fields instead of live stats.
pub fn snapshot_satisfies(kind: &MilestoneKind, snapshot: &StatSnapshot) -> bool {
    match kind {
        MilestoneKind::Skill99 { skill } => snapshot.skill_level(*skill) >= MAX_LEVEL,
        MilestoneKind::BaseLevel { level } => snapshot.min_skill_level() >= *level,
        MilestoneKind::TotalLevel { level } => snapshot.total_level >= *level,
        MilestoneKind::CombatLevel { level } => snapshot.combat_level >= *level,
        MilestoneKind::BossKc { boss, kills } => snapshot.boss_kc(boss) >= *kills,
        MilestoneKind::MaxCape => {
            snapshot.total_level >= MAX_TOTAL_LEVEL
                || Skill::ALL
                    .iter()
                    .all(|&skill| snapshot.skill_level(skill) >= MAX_LEVEL)
        }
    }
}

/// Timestamp of the first snapshot satisfying `kind`.
///
/// `history` must be ordered by `created_at` ascending.
pub fn first_achieved_at(kind: &MilestoneKind, history: &[StatSnapshot]) -> Option<Timestamp> {
    history
        .iter()
        .find(|snapshot| snapshot_satisfies(kind, snapshot))
        .map(|snapshot| snapshot.created_at)
}

/// Fill `achieved_at` on every achieved milestone from `history`.
///
/// In-progress milestones are skipped. An achieved milestone stays `None`
/// when no snapshot satisfies it (reached after the last snapshot, or no
/// history was recorded).
pub fn resolve_achievement_dates(milestones: &mut [Milestone], history: &[StatSnapshot]) {
    if history.is_empty() {
        return;
    }
    for milestone in milestones.iter_mut().filter(|m| m.is_achieved()) {
        milestone.achieved_at = first_achieved_at(&milestone.kind, history);
    }
}
