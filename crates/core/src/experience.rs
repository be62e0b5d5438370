//! Experience curve, combat level formula and XP formatting.

use std::sync::OnceLock;

use crate::skills::MAX_LEVEL;

/// Highest virtual level shown for skills past 99.
pub const MAX_VIRTUAL_LEVEL: i32 = 126;

/// Experience cap of a single skill.
pub const MAX_SKILL_XP: i64 = 200_000_000;

/// Cumulative XP required per level, index 0 is level 1.
fn xp_table() -> &'static [i64] {
    static TABLE: OnceLock<Vec<i64>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = Vec::with_capacity(MAX_VIRTUAL_LEVEL as usize);
        let mut points = 0.0_f64;
        table.push(0);
        for level in 1..MAX_VIRTUAL_LEVEL {
            let l = f64::from(level);
            points += (l + 300.0 * 2f64.powf(l / 7.0)).floor();
            table.push((points / 4.0).floor() as i64);
        }
        table
    })
}

/// Minimum XP required to reach `level`.
///
/// Levels below 1 clamp to 1 and levels above 126 clamp to 126.
pub fn xp_for_level(level: i32) -> i64 {
    let level = level.clamp(1, MAX_VIRTUAL_LEVEL);
    xp_table()[(level - 1) as usize]
}

/// Level reached with `xp` experience, capped at 99.
pub fn level_for_xp(xp: i64) -> i32 {
    virtual_level_for_xp(xp).min(MAX_LEVEL)
}

/// Level reached with `xp` experience, allowing virtual levels up to 126.
pub fn virtual_level_for_xp(xp: i64) -> i32 {
    let table = xp_table();
    // First index whose requirement exceeds xp; the level is that index.
    let idx = table.partition_point(|&required| required <= xp);
    (idx as i32).max(1)
}

/// Combat level from the seven combat skills.
pub fn combat_level(
    attack: i32,
    strength: i32,
    defence: i32,
    hitpoints: i32,
    ranged: i32,
    magic: i32,
    prayer: i32,
) -> i32 {
    let base = 0.25 * f64::from(defence + hitpoints + prayer / 2);
    let melee = 0.325 * f64::from(attack + strength);
    let range = 0.325 * f64::from(ranged * 3 / 2);
    let mage = 0.325 * f64::from(magic * 3 / 2);
    (base + melee.max(range).max(mage)).floor() as i32
}

/// Compact XP label rounded like `{:.1}`: `950`, `12.3K`, `13M`, `4.6B`.
pub fn format_xp_short(xp: i64) -> String {
    let abs = xp.unsigned_abs();
    let sign = if xp < 0 { "-" } else { "" };
    let (unit, suffix, decimals) = match abs {
        0..=999 => return xp.to_string(),
        1_000..=999_999 => (1_000_u128, "K", 1_u32),
        1_000_000..=999_999_999 => (1_000_000, "M", 1),
        _ => (1_000_000_000, "B", 2),
    };
    // Round half up; the suffix stays with the magnitude bucket, so 999,999
    // reads "1000K".
    let factor = 10_u128.pow(decimals);
    let scaled = (u128::from(abs) * factor + unit / 2) / unit;
    let whole = scaled / factor;
    let frac = scaled % factor;
    let mut text = format!("{whole}.{frac:0width$}", width = decimals as usize);
    text = text.trim_end_matches('0').trim_end_matches('.').to_string();
    format!("{sign}{text}{suffix}")
}
