use std::sync::Arc;

use runetrack_db::PlayerStore;
use runetrack_events::EventBus;
use runetrack_hiscores::HiscoresSource;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Snapshot persistence; an `UnavailableStore` when no database is configured.
    pub store: Arc<dyn PlayerStore>,
    /// Upstream hiscores lookups.
    pub hiscores: Arc<dyn HiscoresSource>,
    pub event_bus: Arc<EventBus>,
    pub config: Arc<ServerConfig>,
}
