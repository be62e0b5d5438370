//! Upstream hiscores access.
//!
//! - [`HiscoresSource`] -- capability trait for fetching one hiscores variant.
//! - [`HttpHiscores`] -- `reqwest` transport for the public `index_lite`
//!   endpoints.
//! - [`lookup_player`] -- concurrent fan-out across account-type variants.

pub mod client;
pub mod lookup;

use async_trait::async_trait;
use runetrack_core::error::CoreError;
use runetrack_core::stats::{AccountType, PlayerStats};

pub use client::HttpHiscores;
pub use lookup::lookup_player;

/// Errors from the hiscores layer.
#[derive(Debug, thiserror::Error)]
pub enum HiscoresError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Hiscores request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The hiscores returned a non-2xx, non-404 status code.
    #[error("Hiscores returned HTTP {0}")]
    Status(u16),

    /// The body did not match the expected CSV layout.
    #[error(transparent)]
    Decode(#[from] CoreError),
}

impl From<HiscoresError> for CoreError {
    fn from(err: HiscoresError) -> Self {
        match err {
            HiscoresError::Decode(core) => core,
            other => CoreError::Upstream(other.to_string()),
        }
    }
}

/// Fetches parsed stats from a single hiscores variant.
#[async_trait]
pub trait HiscoresSource: Send + Sync {
    /// `Ok(None)` when `username` is not listed on the `account_type`
    /// hiscores.
    async fn fetch(
        &self,
        username: &str,
        account_type: AccountType,
    ) -> Result<Option<PlayerStats>, HiscoresError>;
}
