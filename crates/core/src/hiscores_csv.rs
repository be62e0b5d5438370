//! Decoder for the hiscores `index_lite` CSV format.
//!
//! The body is one line per entry in a fixed order:
//!
//! ```text
//! rank,level,xp      overall
//! rank,level,xp      x24 skills (see `Skill::ALL`)
//! rank,score         x19 activities (ignored)
//! rank,kills         one per boss (see `bosses::BOSSES`)
//! ```
//!
//! `-1` marks an unranked entry.

use std::collections::BTreeMap;

use crate::bosses::{ACTIVITIES, BOSSES};
use crate::error::CoreError;
use crate::experience::level_for_xp;
use crate::skills::{Skill, SKILL_COUNT};
use crate::stats::{AccountType, BossStats, PlayerStats, SkillStats};

fn parse_field(line_no: usize, raw: &str) -> Result<i64, CoreError> {
    raw.trim().parse::<i64>().map_err(|_| {
        CoreError::Upstream(format!(
            "Malformed hiscores line {line_no}: '{raw}' is not a number"
        ))
    })
}

fn parse_line(line_no: usize, line: &str, expected: usize) -> Result<Vec<i64>, CoreError> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != expected {
        return Err(CoreError::Upstream(format!(
            "Malformed hiscores line {line_no}: expected {expected} fields, got {}",
            fields.len()
        )));
    }
    fields.iter().map(|f| parse_field(line_no, f)).collect()
}

fn rank(raw: i64) -> Option<i64> {
    (raw > 0).then_some(raw)
}

/// Decode a hiscores CSV body into a [`PlayerStats`].
///
/// Trailing boss rows that are missing (older schema) decode as zero kills;
/// extra rows beyond the known bosses are ignored.
pub fn parse_hiscores_csv(
    body: &str,
    username: &str,
    account_type: AccountType,
) -> Result<PlayerStats, CoreError> {
    let lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < 1 + SKILL_COUNT {
        return Err(CoreError::Upstream(format!(
            "Hiscores response has {} lines, expected at least {}",
            lines.len(),
            1 + SKILL_COUNT
        )));
    }

    let overall = parse_line(1, lines[0], 3)?;
    let overall_xp = (overall[2] >= 0).then_some(overall[2]);

    let mut skills = BTreeMap::new();
    for (i, skill) in Skill::ALL.iter().enumerate() {
        let line_no = i + 2;
        let row = parse_line(line_no, lines[i + 1], 3)?;
        let xp = row[2].max(0);
        let level = if row[1] > 0 {
            row[1] as i32
        } else {
            level_for_xp(xp)
        };
        skills.insert(
            *skill,
            SkillStats {
                level,
                xp,
                rank: rank(row[0]),
            },
        );
    }

    let boss_start = 1 + SKILL_COUNT + ACTIVITIES.len();
    let mut bosses = BTreeMap::new();
    for (i, boss) in BOSSES.iter().enumerate() {
        let Some(line) = lines.get(boss_start + i) else {
            break;
        };
        let row = parse_line(boss_start + i + 1, line, 2)?;
        let kill_count = row[1].max(0);
        if kill_count > 0 {
            bosses.insert(
                (*boss).to_string(),
                BossStats {
                    kill_count,
                    rank: rank(row[0]),
                },
            );
        }
    }

    Ok(PlayerStats::new(
        username,
        account_type,
        overall_xp,
        skills,
        bosses,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// Build a CSV body with every skill at `level`/`xp` and the given boss
    /// kill counts.
    fn body(level: i32, xp: i64, boss_kc: &[(usize, i64)]) -> String {
        let mut out = vec![format!("100,{},{}", level * 24, xp * 24)];
        for _ in 0..SKILL_COUNT {
            out.push(format!("5000,{level},{xp}"));
        }
        for _ in 0..ACTIVITIES.len() {
            out.push("-1,-1".to_string());
        }
        for i in 0..BOSSES.len() {
            let kc = boss_kc
                .iter()
                .find(|(idx, _)| *idx == i)
                .map_or(-1, |(_, kc)| *kc);
            out.push(format!("{},{kc}", if kc > 0 { 900 } else { -1 }));
        }
        out.join("\n")
    }

    #[test]
    fn decodes_skills_and_totals() {
        let stats = parse_hiscores_csv(&body(70, 737_627, &[]), "Tester", AccountType::Ironman)
            .unwrap();
        assert_eq!(stats.username, "Tester");
        assert_eq!(stats.account_type, AccountType::Ironman);
        assert_eq!(stats.total_level, 70 * 24);
        assert_eq!(stats.total_xp, 737_627 * 24);
        assert_eq!(stats.skill_level(Skill::Sailing), 70);
        assert_eq!(stats.skills[&Skill::Attack].rank, Some(5000));
        assert!(stats.bosses.is_empty());
    }

    #[test]
    fn keeps_only_bosses_with_kills() {
        let zulrah = BOSSES.iter().position(|b| *b == "Zulrah").unwrap();
        let stats =
            parse_hiscores_csv(&body(50, 101_333, &[(zulrah, 321)]), "x", AccountType::Normal)
                .unwrap();
        assert_eq!(stats.bosses.len(), 1);
        assert_eq!(stats.boss_kc("Zulrah"), 321);
        assert_eq!(stats.bosses["Zulrah"].rank, Some(900));
    }

    #[test]
    fn unranked_skill_defaults_to_level_one() {
        let mut lines: Vec<String> = body(40, 37_224, &[]).lines().map(String::from).collect();
        lines[1] = "-1,-1,-1".to_string();
        let stats = parse_hiscores_csv(&lines.join("\n"), "x", AccountType::Normal).unwrap();
        assert_eq!(stats.skills[&Skill::Attack].level, 1);
        assert_eq!(stats.skills[&Skill::Attack].xp, 0);
        assert_eq!(stats.skills[&Skill::Attack].rank, None);
    }

    #[test]
    fn tolerates_missing_trailing_bosses() {
        let lines: Vec<String> = body(10, 1_154, &[]).lines().map(String::from).collect();
        let truncated = lines[..1 + SKILL_COUNT + ACTIVITIES.len() + 3].join("\n");
        assert!(parse_hiscores_csv(&truncated, "x", AccountType::Normal).is_ok());
    }

    #[test]
    fn rejects_short_or_malformed_bodies() {
        assert_matches!(
            parse_hiscores_csv("1,2,3\n", "x", AccountType::Normal),
            Err(CoreError::Upstream(_))
        );
        let mut lines: Vec<String> = body(10, 1_154, &[]).lines().map(String::from).collect();
        lines[3] = "1,abc,3".to_string();
        assert_matches!(
            parse_hiscores_csv(&lines.join("\n"), "x", AccountType::Normal),
            Err(CoreError::Upstream(_))
        );
    }
}
