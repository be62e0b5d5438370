use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::name_change::submit_name_change;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameChangeRequest {
    pub new_username: String,
}

/// POST /api/players/{username}/name-change
///
/// Requires a bearer token. Responds 422 with the comparator's reasons when
/// the claim is rejected.
pub async fn submit(
    user: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(input): Json<NameChangeRequest>,
) -> AppResult<impl IntoResponse> {
    tracing::info!(
        user_id = user.user_id,
        old = %username,
        new = %input.new_username,
        "Name change submitted"
    );
    let outcome = submit_name_change(&state, &username, &input.new_username).await?;
    Ok(Json(DataResponse { data: outcome }))
}
