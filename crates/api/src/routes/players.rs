use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{events, name_change, players};
use crate::state::AppState;

/// Routes mounted at `/api/players`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{username}", get(players::get_player))
        .route("/{username}/history", get(players::get_history))
        .route("/{username}/latest", get(players::get_latest))
        .route("/{username}/name-changes", get(players::get_name_changes))
        .route("/{username}/name-change", post(name_change::submit))
        .route("/{username}/snapshot", post(players::take_snapshot))
        .route("/{username}/events", get(events::player_events))
}
