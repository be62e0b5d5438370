//! Handlers for live player lookups, snapshots and stored history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::services::players;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotRequest {
    /// Ignore the snapshot cooldown.
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/players/{username}
///
/// Live stats from the hiscores. A snapshot is saved in the background when
/// persistence is configured.
pub async fn get_player(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let stats = players::fetch_live(&state, &username).await?;
    players::spawn_background_save(&state, stats.clone());
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/players/{username}/history
pub async fn get_history(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let history = players::player_history(&state, &username).await?;
    Ok(Json(DataResponse { data: history }))
}

/// GET /api/players/{username}/latest
///
/// The newest stored snapshot, without contacting the hiscores.
pub async fn get_latest(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let snapshot = players::latest_snapshot(&state, &username).await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// GET /api/players/{username}/name-changes
pub async fn get_name_changes(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let changes = players::name_change_history(&state, &username).await?;
    Ok(Json(DataResponse { data: changes }))
}

/// POST /api/players/{username}/snapshot
///
/// Fetch live stats and save them now. Returns 201 when a snapshot was
/// written and 200 when it was skipped (cooldown or no persistence). The
/// body is optional; without one the cooldown applies.
pub async fn take_snapshot(
    State(state): State<AppState>,
    Path(username): Path<String>,
    input: Option<Json<SnapshotRequest>>,
) -> AppResult<impl IntoResponse> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let stats = players::fetch_live(&state, &username).await?;
    let outcome = players::save_snapshot(&state, &stats, input.force).await?;
    let status = if outcome.snapshot_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: outcome })))
}
