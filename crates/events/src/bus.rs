//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`PlayerEvent`]s.
//! It is shared via `Arc<EventBus>` across the application. Delivery is
//! best-effort and process-local; a multi-instance deployment needs a
//! durable broker behind the same interface.

use chrono::{DateTime, Utc};
use runetrack_core::stats::normalize_username;
use runetrack_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PlayerEvent
// ---------------------------------------------------------------------------

/// A change to a tracked player.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEvent {
    /// Dot-separated event name, e.g. `"player.snapshot_saved"`.
    pub event_type: String,

    /// Display username the event is about.
    pub username: String,

    pub player_id: Option<DbId>,

    /// Name the player was known by before a rename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_username: Option<String>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl PlayerEvent {
    pub const STATS_FETCHED: &'static str = "player.stats_fetched";
    pub const SNAPSHOT_SAVED: &'static str = "player.snapshot_saved";
    pub const NAME_CHANGED: &'static str = "player.name_changed";

    pub fn new(event_type: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            username: username.into(),
            player_id: None,
            previous_username: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_player(mut self, player_id: DbId) -> Self {
        self.player_id = Some(player_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_previous_username(mut self, username: impl Into<String>) -> Self {
        self.previous_username = Some(username.into());
        self
    }

    /// Whether the event concerns `username` under its current or previous
    /// name (compared normalised).
    pub fn concerns(&self, username: &str) -> bool {
        let key = normalize_username(username);
        normalize_username(&self.username) == key
            || self
                .previous_username
                .as_deref()
                .is_some_and(|previous| normalize_username(previous) == key)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`PlayerEvent`].
///
/// # Usage
///
/// ```rust
/// use runetrack_events::bus::{EventBus, PlayerEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlayerEvent::new(PlayerEvent::SNAPSHOT_SAVED, "Zezima"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: PlayerEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    /// Subscribe to events about a single player.
    pub fn subscribe_player(&self, username: &str) -> PlayerSubscription {
        PlayerSubscription {
            username: username.to_string(),
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// PlayerSubscription
// ---------------------------------------------------------------------------

/// A bus receiver that only yields events about one player.
pub struct PlayerSubscription {
    username: String,
    receiver: broadcast::Receiver<PlayerEvent>,
}

impl PlayerSubscription {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Wait for the next event about this player.
    ///
    /// Returns `None` once the bus is dropped. Lagged events are skipped with
    /// a warning.
    pub async fn next(&mut self) -> Option<PlayerEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.concerns(&self.username) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        username = %self.username,
                        "Player subscription lagged"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = PlayerEvent::new(PlayerEvent::SNAPSHOT_SAVED, "Zezima")
            .with_player(42)
            .with_payload(serde_json::json!({"snapshotId": 7}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "player.snapshot_saved");
        assert_eq!(received.username, "Zezima");
        assert_eq!(received.player_id, Some(42));
        assert_eq!(received.payload["snapshotId"], 7);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(PlayerEvent::new(PlayerEvent::STATS_FETCHED, "a"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, PlayerEvent::STATS_FETCHED);
        assert_eq!(e2.event_type, PlayerEvent::STATS_FETCHED);
    }

    #[tokio::test]
    async fn player_subscription_filters_other_players() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe_player("lynx_titan");

        bus.publish(PlayerEvent::new(PlayerEvent::SNAPSHOT_SAVED, "Zezima"));
        bus.publish(PlayerEvent::new(PlayerEvent::SNAPSHOT_SAVED, "Lynx Titan"));

        let event = sub.next().await.expect("should receive own event");
        assert_eq!(event.username, "Lynx Titan");
    }

    #[tokio::test]
    async fn rename_reaches_subscribers_of_the_old_name() {
        let bus = EventBus::default();
        let mut old_name = bus.subscribe_player("Old Name");
        let mut new_name = bus.subscribe_player("new_name");

        bus.publish(
            PlayerEvent::new(PlayerEvent::NAME_CHANGED, "New Name").with_previous_username("Old Name"),
        );

        let event = old_name.next().await.expect("old name should see the rename");
        assert_eq!(event.previous_username.as_deref(), Some("Old Name"));
        assert_eq!(new_name.next().await.unwrap().username, "New Name");
    }

    #[test]
    fn previous_username_is_omitted_when_absent() {
        let json = serde_json::to_value(PlayerEvent::new(PlayerEvent::STATS_FETCHED, "a")).unwrap();
        assert!(json.get("previousUsername").is_none());
    }

    #[tokio::test]
    async fn subscription_ends_when_bus_dropped() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe_player("x");
        drop(bus);
        assert!(sub.next().await.is_none());
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(PlayerEvent::new("orphan.event", "nobody"));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
