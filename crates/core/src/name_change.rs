//! Name-change plausibility checks.
//!
//! A player claiming a rename from `old` to `new` has no proof beyond the
//! stats themselves. [`compare_players`] decides whether the stats under the
//! new name can be a continuation of the stats last recorded under the old
//! name, bounding progress by time-based rate limits.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::experience::format_xp_short;
use crate::skills::Skill;
use crate::stats::{normalize_username, validate_username, PlayerStats};
use crate::types::Timestamp;

/// Tunable limits for [`compare_players`].
///
/// Defaults assume roughly twelve hours of efficient play per day plus a
/// 10-20% buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NameChangeThresholds {
    /// Floor on elapsed time so same-day checks don't divide into nothing.
    pub min_elapsed_days: f64,
    /// Allowed total-XP regression as a fraction of the old total.
    pub xp_tolerance_ratio: f64,
    /// Allowed total-XP regression floor.
    pub min_xp_tolerance: i64,
    pub total_level_tolerance: i32,
    pub max_daily_xp: i64,
    pub daily_xp_buffer: f64,
    /// Skill XP per hour; skills missing from the map use `default_skill_xp_rate`.
    pub skill_xp_rates: BTreeMap<Skill, i64>,
    pub default_skill_xp_rate: i64,
    pub skill_rate_buffer: f64,
    /// More than this many skills losing over `skill_regression_levels` fails.
    pub max_skill_regressions: usize,
    pub skill_regression_levels: i32,
    /// More than this many bosses losing over `boss_regression_kills` fails.
    pub max_boss_regressions: usize,
    pub boss_regression_kills: i64,
    /// Kills per hour by boss name.
    pub boss_kc_rates: BTreeMap<String, f64>,
    pub default_boss_kc_rate: f64,
    pub boss_rate_buffer: f64,
    /// Reject when the old name still resolves with matching stats instead
    /// of proceeding with a warning.
    pub strict_old_name_check: bool,
}

fn default_skill_xp_rates() -> BTreeMap<Skill, i64> {
    use Skill::*;
    [
        (Attack, 200_000),
        (Defence, 200_000),
        (Strength, 200_000),
        (Hitpoints, 150_000),
        (Ranged, 300_000),
        (Prayer, 700_000),
        (Magic, 450_000),
        (Cooking, 1_000_000),
        (Woodcutting, 150_000),
        (Fletching, 900_000),
        (Fishing, 150_000),
        (Firemaking, 450_000),
        (Crafting, 400_000),
        (Smithing, 400_000),
        (Mining, 120_000),
        (Herblore, 500_000),
        (Agility, 90_000),
        (Thieving, 300_000),
        (Slayer, 120_000),
        (Farming, 600_000),
        (Runecraft, 50_000),
        (Hunter, 200_000),
        (Construction, 900_000),
        (Sailing, 150_000),
    ]
    .into_iter()
    .collect()
}

fn default_boss_kc_rates() -> BTreeMap<String, f64> {
    [
        ("Barrows Chests", 25.0),
        ("Chambers of Xeric", 4.0),
        ("Chambers of Xeric: Challenge Mode", 2.0),
        ("Corporeal Beast", 30.0),
        ("Nex", 10.0),
        ("Phosani's Nightmare", 12.0),
        ("Sol Heredit", 2.0),
        ("Tempoross", 10.0),
        ("The Corrupted Gauntlet", 7.0),
        ("The Gauntlet", 8.0),
        ("Theatre of Blood", 4.0),
        ("Theatre of Blood: Hard Mode", 3.0),
        ("Tombs of Amascut", 4.0),
        ("Tombs of Amascut: Expert Mode", 3.0),
        ("TzKal-Zuk", 1.0),
        ("TzTok-Jad", 3.0),
        ("Vorkath", 35.0),
        ("Wintertodt", 15.0),
        ("Zalcano", 12.0),
        ("Zulrah", 40.0),
    ]
    .into_iter()
    .map(|(name, rate)| (name.to_string(), rate))
    .collect()
}

impl Default for NameChangeThresholds {
    fn default() -> Self {
        Self {
            min_elapsed_days: 1.0,
            xp_tolerance_ratio: 0.01,
            min_xp_tolerance: 10_000,
            total_level_tolerance: 2,
            max_daily_xp: 20_000_000,
            daily_xp_buffer: 1.1,
            skill_xp_rates: default_skill_xp_rates(),
            default_skill_xp_rate: 500_000,
            skill_rate_buffer: 1.2,
            max_skill_regressions: 3,
            skill_regression_levels: 1,
            max_boss_regressions: 2,
            boss_regression_kills: 5,
            boss_kc_rates: default_boss_kc_rates(),
            default_boss_kc_rate: 100.0,
            boss_rate_buffer: 1.2,
            strict_old_name_check: false,
        }
    }
}

impl NameChangeThresholds {
    /// Defaults with environment overrides.
    ///
    /// | Env Var                        | Default      |
    /// |--------------------------------|--------------|
    /// | `NAME_CHANGE_MAX_DAILY_XP`     | `20000000`   |
    /// | `NAME_CHANGE_MIN_ELAPSED_DAYS` | `1.0`        |
    /// | `NAME_CHANGE_STRICT_OLD_NAME`  | `false`      |
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut thresholds = Self::default();
        if let Some(v) = env_parse("NAME_CHANGE_MAX_DAILY_XP") {
            thresholds.max_daily_xp = v;
        }
        if let Some(v) = env_parse("NAME_CHANGE_MIN_ELAPSED_DAYS") {
            thresholds.min_elapsed_days = v;
        }
        if let Some(v) = env_parse("NAME_CHANGE_STRICT_OLD_NAME") {
            thresholds.strict_old_name_check = v;
        }
        thresholds
    }

    pub fn skill_rate(&self, skill: Skill) -> i64 {
        self.skill_xp_rates
            .get(&skill)
            .copied()
            .unwrap_or(self.default_skill_xp_rate)
    }

    pub fn boss_rate(&self, boss: &str) -> f64 {
        self.boss_kc_rates
            .get(boss)
            .copied()
            .unwrap_or(self.default_boss_kc_rate)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}

/// A gain above what the elapsed time allows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateViolation {
    pub name: String,
    pub gained: i64,
    pub allowed: i64,
}

/// Outcome of [`compare_players`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub accepted: bool,
    /// Human-readable failure reasons; empty when accepted.
    pub reasons: Vec<String>,
    /// Tolerated irregularities worth surfacing.
    pub warnings: Vec<String>,
    pub elapsed_days: f64,
    pub xp_gained: i64,
    pub skill_violations: Vec<RateViolation>,
    pub boss_violations: Vec<RateViolation>,
}

impl ComparisonReport {
    /// All reasons joined for display.
    pub fn reason(&self) -> String {
        self.reasons.join("; ")
    }

    /// Fail the comparison with an extra reason.
    pub fn reject(&mut self, reason: impl Into<String>) {
        self.accepted = false;
        self.reasons.push(reason.into());
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// Decide whether `new` can be the same account as `old`, last updated at
/// `old_updated_at`.
pub fn compare_players(
    old: &PlayerStats,
    old_updated_at: Timestamp,
    new: &PlayerStats,
    now: Timestamp,
    thresholds: &NameChangeThresholds,
) -> ComparisonReport {
    let elapsed_days = ((now - old_updated_at).num_seconds() as f64 / 86_400.0)
        .max(thresholds.min_elapsed_days);
    let elapsed_hours = elapsed_days * 24.0;
    let xp_gained = new.total_xp - old.total_xp;

    let mut report = ComparisonReport {
        accepted: true,
        reasons: Vec::new(),
        warnings: Vec::new(),
        elapsed_days,
        xp_gained,
        skill_violations: Vec::new(),
        boss_violations: Vec::new(),
    };

    // Total XP may only dip by hiscores staleness, never regress.
    let xp_tolerance = ((old.total_xp as f64 * thresholds.xp_tolerance_ratio) as i64)
        .max(thresholds.min_xp_tolerance);
    if new.total_xp < old.total_xp - xp_tolerance {
        report.reject(format!(
            "Total XP decreased from {} to {}",
            format_xp_short(old.total_xp),
            format_xp_short(new.total_xp)
        ));
    }

    if new.total_level < old.total_level - thresholds.total_level_tolerance {
        report.reject(format!(
            "Total level decreased from {} to {}",
            old.total_level, new.total_level
        ));
    }

    let max_total_gain =
        allowance(thresholds.max_daily_xp as f64 * elapsed_days * thresholds.daily_xp_buffer);
    if xp_gained > max_total_gain {
        report.reject(format!(
            "Unrealistic total XP gain: {} XP in {elapsed_days:.1} days (max {})",
            format_xp_short(xp_gained),
            format_xp_short(max_total_gain)
        ));
        return report;
    }

    check_skills(old, new, elapsed_hours, thresholds, &mut report);
    check_bosses(old, new, elapsed_hours, thresholds, &mut report);

    report
}

/// Whole units allowed by a rate product, absorbing float error such as
/// `1_200_000.0 * 1.2 == 1_439_999.999...`.
fn allowance(limit: f64) -> i64 {
    (limit + 1e-6).floor() as i64
}

fn check_skills(
    old: &PlayerStats,
    new: &PlayerStats,
    elapsed_hours: f64,
    thresholds: &NameChangeThresholds,
    report: &mut ComparisonReport,
) {
    let mut regressed = Vec::new();

    for skill in Skill::ALL {
        let gained = new.skill_xp(skill) - old.skill_xp(skill);
        let allowed = allowance(
            thresholds.skill_rate(skill) as f64 * elapsed_hours * thresholds.skill_rate_buffer,
        );
        if gained > allowed {
            report.reject(format!(
                "Unrealistic {skill} XP gain: {} XP in {elapsed_hours:.0} hours (max {})",
                format_xp_short(gained),
                format_xp_short(allowed)
            ));
            report.skill_violations.push(RateViolation {
                name: skill.display_name(),
                gained,
                allowed,
            });
        }

        let drop = old.skill_level(skill) - new.skill_level(skill);
        if drop > thresholds.skill_regression_levels {
            regressed.push(skill);
        }
    }

    if regressed.len() > thresholds.max_skill_regressions {
        report.reject(format!(
            "{} skills decreased by more than {} level(s)",
            regressed.len(),
            thresholds.skill_regression_levels
        ));
    } else if !regressed.is_empty() {
        let names: Vec<String> = regressed.iter().map(|s| s.display_name()).collect();
        report
            .warnings
            .push(format!("Minor level decrease in {}", names.join(", ")));
    }
}

fn check_bosses(
    old: &PlayerStats,
    new: &PlayerStats,
    elapsed_hours: f64,
    thresholds: &NameChangeThresholds,
    report: &mut ComparisonReport,
) {
    let names: BTreeSet<&String> = old.bosses.keys().chain(new.bosses.keys()).collect();
    let mut regressed = 0;

    for boss in names {
        let old_kc = old.boss_kc(boss);
        let new_kc = new.boss_kc(boss);

        if old_kc - new_kc > thresholds.boss_regression_kills {
            regressed += 1;
        }

        let gained = new_kc - old_kc;
        let allowed =
            allowance(thresholds.boss_rate(boss) * elapsed_hours * thresholds.boss_rate_buffer);
        if gained > allowed {
            report.reject(format!(
                "Unrealistic {boss} kill count gain: {gained} kills in {elapsed_hours:.0} hours (max {allowed})"
            ));
            report.boss_violations.push(RateViolation {
                name: boss.clone(),
                gained,
                allowed,
            });
        }
    }

    if regressed > thresholds.max_boss_regressions {
        report.reject(format!(
            "{regressed} bosses lost more than {} kills",
            thresholds.boss_regression_kills
        ));
    }
}

/// Lifecycle of a name-change claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Validated,
    Rejected,
}

/// A claimed rename moving from `pending` to `validated` or `rejected`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameChangeClaim {
    pub old_username: String,
    pub new_username: String,
    pub status: ClaimStatus,
    pub reason: Option<String>,
}

impl NameChangeClaim {
    /// Open a pending claim. Both names must be valid and distinct after
    /// normalisation.
    pub fn new(old_username: &str, new_username: &str) -> Result<Self, CoreError> {
        validate_username(old_username)?;
        validate_username(new_username)?;
        if normalize_username(old_username) == normalize_username(new_username) {
            return Err(CoreError::ValidationFailed(
                "Old and new usernames are the same".into(),
            ));
        }
        Ok(Self {
            old_username: old_username.trim().to_string(),
            new_username: new_username.trim().to_string(),
            status: ClaimStatus::Pending,
            reason: None,
        })
    }

    pub fn validate(&mut self) -> Result<(), CoreError> {
        self.transition(ClaimStatus::Validated, None)
    }

    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), CoreError> {
        self.transition(ClaimStatus::Rejected, Some(reason.into()))
    }

    /// Apply a comparison outcome to a pending claim.
    pub fn resolve(&mut self, report: &ComparisonReport) -> Result<(), CoreError> {
        if report.accepted {
            self.validate()
        } else {
            self.reject(report.reason())
        }
    }

    fn transition(&mut self, to: ClaimStatus, reason: Option<String>) -> Result<(), CoreError> {
        if self.status != ClaimStatus::Pending {
            return Err(CoreError::Conflict(format!(
                "Name change claim already {:?}",
                self.status
            )));
        }
        self.status = to;
        self.reason = reason;
        Ok(())
    }
}
