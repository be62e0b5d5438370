//! Event log sink.
//!
//! [`EventLogger`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! writes every received [`PlayerEvent`] to the tracing log. It runs as a
//! long-lived background task and exits when the bus sender is dropped.

use tokio::sync::broadcast;

use crate::bus::PlayerEvent;

pub struct EventLogger;

impl EventLogger {
    /// Run the logging loop until the channel closes. Returns the number of
    /// events logged.
    pub async fn run(mut receiver: broadcast::Receiver<PlayerEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::info!(
                        event_type = %event.event_type,
                        username = %event.username,
                        player_id = ?event.player_id,
                        "Player event"
                    );
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event logger shutting down");
                    break;
                }
            }
        }
        logged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;

    #[tokio::test]
    async fn logs_until_bus_closes() {
        let bus = EventBus::default();
        let handle = tokio::spawn(EventLogger::run(bus.subscribe()));

        bus.publish(PlayerEvent::new(PlayerEvent::NAME_CHANGED, "a"));
        bus.publish(PlayerEvent::new(PlayerEvent::SNAPSHOT_SAVED, "b"));
        drop(bus);

        assert_eq!(handle.await.unwrap(), 2);
    }
}
