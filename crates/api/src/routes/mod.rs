pub mod health;
pub mod milestones;
pub mod players;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /players/{username}                    live stats (GET)
/// /players/{username}/history            stored snapshots, oldest first (GET)
/// /players/{username}/latest             newest stored snapshot (GET)
/// /players/{username}/name-changes       recorded renames (GET)
/// /players/{username}/name-change        submit a rename (POST, auth required)
/// /players/{username}/snapshot           save a snapshot now (POST)
/// /players/{username}/events             server-sent event feed (GET)
///
/// /milestones/{username}                 milestones + nearest 99s (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/players", players::router())
        .nest("/milestones", milestones::router())
}
