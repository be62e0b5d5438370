//! Live player statistics as returned by the hiscores.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::experience::combat_level;
use crate::skills::{Skill, MAX_LEVEL, SKILL_COUNT};

/// Hiscores variant an account is listed under.
///
/// Variants are ordered by restrictiveness: `Ultimate > Hardcore > Ironman >
/// Normal`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Normal,
    Ironman,
    Hardcore,
    Ultimate,
}

impl AccountType {
    pub const ALL: [AccountType; 4] = [
        AccountType::Normal,
        AccountType::Ironman,
        AccountType::Hardcore,
        AccountType::Ultimate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Normal => "normal",
            AccountType::Ironman => "ironman",
            AccountType::Hardcore => "hardcore",
            AccountType::Ultimate => "ultimate",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::ValidationFailed(format!("Unknown account type '{s}'")))
    }
}

/// One skill row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillStats {
    pub level: i32,
    pub xp: i64,
    /// `None` when the player is unranked in this skill.
    pub rank: Option<i64>,
}

impl Default for SkillStats {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            rank: None,
        }
    }
}

/// One boss row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossStats {
    pub kill_count: i64,
    pub rank: Option<i64>,
}

/// A player's full stat sheet at the time of lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub username: String,
    pub account_type: AccountType,
    /// Sum of skill levels, each capped at 99.
    pub total_level: i32,
    pub total_xp: i64,
    pub combat_level: i32,
    pub skills: BTreeMap<Skill, SkillStats>,
    /// Keyed by boss display name.
    pub bosses: BTreeMap<String, BossStats>,
}

impl PlayerStats {
    /// Build a stat sheet, deriving the capped total level and combat level
    /// from the skill rows.
    ///
    /// Missing skills are filled in as level 1 with no XP. `total_xp` falls
    /// back to the sum of skill XP when the overall row is unranked.
    pub fn new(
        username: impl Into<String>,
        account_type: AccountType,
        total_xp: Option<i64>,
        mut skills: BTreeMap<Skill, SkillStats>,
        bosses: BTreeMap<String, BossStats>,
    ) -> Self {
        for skill in Skill::ALL {
            skills.entry(skill).or_default();
        }
        let total_level = capped_total_level(skills.values().map(|s| s.level));
        let summed_xp: i64 = skills.values().map(|s| s.xp.max(0)).sum();
        let level = |skill: Skill| skills.get(&skill).map_or(1, |s| s.level);
        let combat_level = combat_level(
            level(Skill::Attack),
            level(Skill::Strength),
            level(Skill::Defence),
            level(Skill::Hitpoints),
            level(Skill::Ranged),
            level(Skill::Magic),
            level(Skill::Prayer),
        );
        Self {
            username: username.into(),
            account_type,
            total_level,
            total_xp: total_xp.unwrap_or(summed_xp),
            combat_level,
            skills,
            bosses,
        }
    }

    /// Current level in `skill`, 1 if unknown.
    pub fn skill_level(&self, skill: Skill) -> i32 {
        self.skills.get(&skill).map_or(1, |s| s.level)
    }

    /// Current XP in `skill`, 0 if unknown or unranked.
    pub fn skill_xp(&self, skill: Skill) -> i64 {
        self.skills.get(&skill).map_or(0, |s| s.xp.max(0))
    }

    /// Lowest level across all 24 skills.
    pub fn min_skill_level(&self) -> i32 {
        Skill::ALL
            .iter()
            .map(|&skill| self.skill_level(skill))
            .min()
            .unwrap_or(1)
    }

    /// Kill count for `boss`, 0 when untouched.
    pub fn boss_kc(&self, boss: &str) -> i64 {
        self.bosses.get(boss).map_or(0, |b| b.kill_count.max(0))
    }

    /// Number of skills at level 99.
    pub fn maxed_skill_count(&self) -> usize {
        Skill::ALL
            .iter()
            .filter(|&&skill| self.skill_level(skill) >= MAX_LEVEL)
            .count()
    }
}

/// Sum of levels, each capped at 99.
pub fn capped_total_level(levels: impl IntoIterator<Item = i32>) -> i32 {
    levels.into_iter().map(|l| l.clamp(1, MAX_LEVEL)).sum()
}

/// Highest attainable total level.
pub const MAX_TOTAL_LEVEL: i32 = MAX_LEVEL * SKILL_COUNT as i32;

/// Canonical form of an OSRS username used for lookups and uniqueness.
///
/// OSRS treats `_`, `-` and non-breaking spaces as spaces and names are
/// case-insensitive.
pub fn normalize_username(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '_' | '-' | '\u{a0}' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validate a username as accepted by the game: 1 to 12 characters of
/// letters, digits, spaces, `_` or `-`.
pub fn validate_username(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 12 {
        return Err(CoreError::ValidationFailed(format!(
            "Username must be 1-12 characters, got '{name}'"
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
    {
        return Err(CoreError::ValidationFailed(format!(
            "Username contains invalid characters: '{name}'"
        )));
    }
    Ok(())
}
