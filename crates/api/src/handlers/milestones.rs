use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::services::milestones::{milestone_report, DEFAULT_NEAREST};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MilestoneQuery {
    /// How many unfinished 99s to list. Defaults to [`DEFAULT_NEAREST`].
    pub nearest: Option<usize>,
}

/// GET /api/milestones/{username}?nearest=N
pub async fn get_milestones(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<MilestoneQuery>,
) -> AppResult<impl IntoResponse> {
    let nearest = query.nearest.unwrap_or(DEFAULT_NEAREST);
    let report = milestone_report(&state, &username, nearest).await?;
    Ok(Json(DataResponse { data: report }))
}
