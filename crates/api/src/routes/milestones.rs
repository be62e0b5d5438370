use axum::routing::get;
use axum::Router;

use crate::handlers::milestones;
use crate::state::AppState;

/// Routes mounted at `/api/milestones`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{username}", get(milestones::get_milestones))
}
