//! Milestones for a live player, dated from stored history.

use runetrack_core::error::CoreError;
use runetrack_core::achievements::resolve_achievement_dates;
use runetrack_core::milestones::{compute_milestones, nearest_99s, summarize, Milestone, MilestoneSummary};
use runetrack_core::snapshot::StatSnapshot;
use runetrack_core::stats::PlayerStats;
use serde::Serialize;

use crate::services::players::fetch_live;
use crate::state::AppState;

/// Number of nearest 99s returned when the caller doesn't ask.
pub const DEFAULT_NEAREST: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneReport {
    pub username: String,
    pub milestones: Vec<Milestone>,
    #[serde(rename = "nearest99s")]
    pub nearest_99s: Vec<Milestone>,
    pub summary: MilestoneSummary,
    /// False when no history could be consulted, so `achievedAt` is unset.
    pub history_available: bool,
}

pub async fn milestone_report(
    state: &AppState,
    username: &str,
    nearest: usize,
) -> Result<MilestoneReport, CoreError> {
    let stats = fetch_live(state, username).await?;
    let history = load_history(state, &stats).await?;

    let mut milestones = compute_milestones(&stats);
    if let Some(history) = &history {
        resolve_achievement_dates(&mut milestones, history);
    }

    Ok(MilestoneReport {
        username: stats.username,
        nearest_99s: nearest_99s(&milestones, nearest),
        summary: summarize(&milestones),
        history_available: history.is_some(),
        milestones,
    })
}

/// Stored snapshots of the player, or `None` without persistence.
async fn load_history(state: &AppState, stats: &PlayerStats) -> Result<Option<Vec<StatSnapshot>>, CoreError> {
    if !state.store.is_available() {
        return Ok(None);
    }
    match state.store.find_player(&stats.username).await? {
        Some(tracked) => Ok(Some(state.store.snapshot_history(tracked.player.id).await?)),
        None => Ok(Some(Vec::new())),
    }
}
