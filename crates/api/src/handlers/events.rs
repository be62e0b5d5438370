//! Server-sent event feed of changes to one player.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use runetrack_core::stats::validate_username;
use runetrack_events::PlayerEvent;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/players/{username}/events
///
/// Streams every bus event about `username` as it is published. The feed
/// only covers this process.
pub async fn player_events(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    validate_username(&username)?;
    let subscription = state.event_bus.subscribe_player(&username);
    tracing::debug!(username = %subscription.username(), "Event feed opened");

    let events = stream::unfold(subscription, |mut subscription| async move {
        let event = subscription.next().await?;
        Some((Ok::<_, Infallible>(to_sse(&event)), subscription))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn to_sse(event: &PlayerEvent) -> Event {
    let sse = Event::default().event(event.event_type.clone());
    match serde_json::to_string(event) {
        Ok(data) => sse.data(data),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode player event");
            sse.comment("encoding error")
        }
    }
}
