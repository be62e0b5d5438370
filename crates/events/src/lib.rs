//! RuneTrack event bus.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlayerEvent`] -- the event envelope published when player data changes.
//! - [`PlayerSubscription`] -- a receiver filtered to a single player.
//! - [`EventLogger`] -- background task writing every event to the tracing log.

pub mod bus;
pub mod logger;

pub use bus::{EventBus, PlayerEvent, PlayerSubscription};
pub use logger::EventLogger;
