//! Name-change submission.
//!
//! A claim `old -> new` is validated against the stats last recorded under
//! `old`. When it passes, the old player is merged into the new one.

use chrono::Utc;
use runetrack_core::error::CoreError;
use runetrack_core::name_change::{compare_players, ComparisonReport, NameChangeClaim};
use runetrack_core::stats::PlayerStats;
use runetrack_core::types::Timestamp;
use runetrack_db::models::name_change::NameChange;
use runetrack_db::models::player::TrackedPlayer;
use runetrack_events::PlayerEvent;
use runetrack_hiscores::{lookup_player, HiscoresError};
use serde::Serialize;
use serde_json::json;

use crate::services::players::{save_snapshot, tracked_player};
use crate::state::AppState;

/// A validated and applied rename.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameChangeOutcome {
    pub claim: NameChangeClaim,
    pub report: ComparisonReport,
    pub change: NameChange,
}

/// Validate and apply a rename of `old_username` to `new_username`.
///
/// Fails with `ValidationFailed` carrying the comparator's reasons when the
/// claim is rejected.
pub async fn submit_name_change(
    state: &AppState,
    old_username: &str,
    new_username: &str,
) -> Result<NameChangeOutcome, CoreError> {
    let mut claim = NameChangeClaim::new(old_username, new_username)?;
    if !state.store.is_available() {
        return Err(CoreError::Unavailable(
            "Name changes need persistence to be configured".into(),
        ));
    }

    let old = tracked_player(state, &claim.old_username).await?;
    let (old_live, new_live) = tokio::join!(
        lookup_player(state.hiscores.as_ref(), &claim.old_username),
        lookup_player(state.hiscores.as_ref(), &claim.new_username),
    );
    let new_stats = new_live?.ok_or_else(|| CoreError::player_not_found(&claim.new_username))?;

    let now = Utc::now();
    let mut report = compare_players(
        &old.stats,
        old.player.updated_at,
        &new_stats,
        now,
        &state.config.name_change,
    );
    check_old_name(state, &old, old_live, now, &mut report);

    claim.resolve(&report)?;
    if !report.accepted {
        tracing::info!(
            old = %claim.old_username,
            new = %claim.new_username,
            reason = %report.reason(),
            "Name change rejected"
        );
        return Err(CoreError::ValidationFailed(report.reason()));
    }

    let change = state
        .store
        .apply_name_change(old.player.id, &new_stats, now)
        .await?;
    tracing::info!(
        old = %change.old_username,
        new = %change.new_username,
        player_id = change.player_id,
        warnings = report.warnings.len(),
        "Name change applied"
    );

    if let Err(e) = save_snapshot(state, &new_stats, false).await {
        tracing::warn!(username = %new_stats.username, error = %e, "Post-rename snapshot failed");
    }

    state.event_bus.publish(
        PlayerEvent::new(PlayerEvent::NAME_CHANGED, &change.new_username)
            .with_player(change.player_id)
            .with_previous_username(&change.old_username)
            .with_payload(json!({
                "oldUsername": change.old_username,
                "newUsername": change.new_username,
            })),
    );

    Ok(NameChangeOutcome {
        claim,
        report,
        change,
    })
}

/// The old name should no longer resolve to the same account.
///
/// A matching hit becomes a warning, or a rejection under
/// `strict_old_name_check`. Lookup failures leave the report untouched.
fn check_old_name(
    state: &AppState,
    old: &TrackedPlayer,
    old_live: Result<Option<PlayerStats>, HiscoresError>,
    now: Timestamp,
    report: &mut ComparisonReport,
) {
    let old_live = match old_live {
        Ok(Some(stats)) => stats,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(username = %old.player.username, error = %e, "Could not re-check old username");
            return;
        }
    };

    let thresholds = &state.config.name_change;
    let still_same = compare_players(&old.stats, old.player.updated_at, &old_live, now, thresholds);
    if !still_same.accepted {
        return;
    }

    let message = format!(
        "Old username '{}' still resolves on the hiscores with matching stats",
        old.player.username
    );
    if thresholds.strict_old_name_check {
        report.reject(message);
    } else {
        report.warn(message);
    }
}
