//! Live lookups, snapshot saves and stored history.

use chrono::Utc;
use runetrack_core::error::CoreError;
use runetrack_core::snapshot::{SnapshotPolicy, StatSnapshot};
use runetrack_core::stats::{validate_username, PlayerStats};
use runetrack_db::models::name_change::NameChange;
use runetrack_db::models::player::{Player, TrackedPlayer};
use runetrack_db::SaveOutcome;
use runetrack_events::PlayerEvent;
use runetrack_hiscores::lookup_player;
use serde::Serialize;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Fetch `username` from the hiscores, resolving its account type.
pub async fn fetch_live(state: &AppState, username: &str) -> Result<PlayerStats, CoreError> {
    validate_username(username)?;
    let stats = lookup_player(state.hiscores.as_ref(), username)
        .await?
        .ok_or_else(|| CoreError::player_not_found(username))?;

    tracing::debug!(
        username = %stats.username,
        account_type = %stats.account_type,
        total_level = stats.total_level,
        "Fetched live stats"
    );
    state.event_bus.publish(
        PlayerEvent::new(PlayerEvent::STATS_FETCHED, &stats.username).with_payload(json!({
            "accountType": stats.account_type,
            "totalLevel": stats.total_level,
            "totalXp": stats.total_xp,
        })),
    );
    Ok(stats)
}

/// Upsert the player and append a snapshot when one is due.
///
/// Returns [`SaveOutcome::Unavailable`] without error when persistence is
/// not configured.
pub async fn save_snapshot(
    state: &AppState,
    stats: &PlayerStats,
    force: bool,
) -> Result<SaveOutcome, CoreError> {
    let policy = SnapshotPolicy::new(force, state.config.snapshot_cooldown_mins);
    let outcome = state.store.save_player(stats, policy, Utc::now()).await?;

    if let SaveOutcome::Created {
        player_id,
        snapshot_id,
        created_at,
    } = &outcome
    {
        tracing::info!(username = %stats.username, player_id, snapshot_id, force, "Snapshot saved");
        state.event_bus.publish(
            PlayerEvent::new(PlayerEvent::SNAPSHOT_SAVED, &stats.username)
                .with_player(*player_id)
                .with_payload(json!({
                    "snapshotId": snapshot_id,
                    "createdAt": created_at,
                    "totalLevel": stats.total_level,
                    "totalXp": stats.total_xp,
                })),
        );
    }
    Ok(outcome)
}

/// Save in the background after a live lookup. Failures are logged and
/// dropped; returns `None` when there is nowhere to save to.
pub fn spawn_background_save(state: &AppState, stats: PlayerStats) -> Option<JoinHandle<()>> {
    if !state.store.is_available() {
        return None;
    }
    let state = state.clone();
    Some(tokio::spawn(async move {
        if let Err(e) = save_snapshot(&state, &stats, false).await {
            tracing::warn!(username = %stats.username, error = %e, "Background snapshot failed");
        }
    }))
}

/// Look a tracked player up, failing when persistence is off or the player
/// has never been saved.
pub async fn tracked_player(state: &AppState, username: &str) -> Result<TrackedPlayer, CoreError> {
    validate_username(username)?;
    state
        .store
        .find_player(username)
        .await?
        .ok_or_else(|| CoreError::player_not_found(username))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHistory {
    pub player: Player,
    /// Oldest first.
    pub snapshots: Vec<StatSnapshot>,
}

pub async fn player_history(state: &AppState, username: &str) -> Result<PlayerHistory, CoreError> {
    let tracked = tracked_player(state, username).await?;
    let snapshots = state.store.snapshot_history(tracked.player.id).await?;
    Ok(PlayerHistory {
        player: tracked.player,
        snapshots,
    })
}

/// Most recent stored snapshot of a tracked player.
pub async fn latest_snapshot(state: &AppState, username: &str) -> Result<StatSnapshot, CoreError> {
    let tracked = tracked_player(state, username).await?;
    state
        .store
        .latest_snapshot(tracked.player.id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Snapshot",
            key: tracked.player.username,
        })
}

pub async fn name_change_history(state: &AppState, username: &str) -> Result<Vec<NameChange>, CoreError> {
    let tracked = tracked_player(state, username).await?;
    Ok(state.store.name_changes(tracked.player.id).await?)
}
