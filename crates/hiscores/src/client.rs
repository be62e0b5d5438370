//! HTTP transport for the OSRS `index_lite` hiscores endpoints.
//!
//! One GET per account-type variant, decoded with
//! [`runetrack_core::hiscores_csv`]. No retries and no caching: transient
//! failures surface to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use runetrack_core::hiscores_csv::parse_hiscores_csv;
use runetrack_core::stats::{AccountType, PlayerStats};

use crate::{HiscoresError, HiscoresSource};

/// Public hiscores host.
pub const DEFAULT_BASE_URL: &str = "https://secure.runescape.com";

/// HTTP request timeout for a single lookup.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Path segment of the hiscores table for an account type.
pub fn table_for(account_type: AccountType) -> &'static str {
    match account_type {
        AccountType::Normal => "hiscore_oldschool",
        AccountType::Ironman => "hiscore_oldschool_ironman",
        AccountType::Hardcore => "hiscore_oldschool_hardcore_ironman",
        AccountType::Ultimate => "hiscore_oldschool_ultimate",
    }
}

/// Hiscores client for a single host.
pub struct HttpHiscores {
    client: reqwest::Client,
    base_url: String,
}

impl HttpHiscores {
    /// Create a client against `base_url`, e.g. `https://secure.runescape.com`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, HiscoresError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("runetrack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// GET request for `username` on the `account_type` table. The player
    /// name goes through reqwest's query encoding.
    pub fn lookup_request(&self, username: &str, account_type: AccountType) -> RequestBuilder {
        let url = format!("{}/m={}/index_lite.ws", self.base_url, table_for(account_type));
        self.client.get(url).query(&[("player", username.trim())])
    }
}

#[async_trait]
impl HiscoresSource for HttpHiscores {
    async fn fetch(
        &self,
        username: &str,
        account_type: AccountType,
    ) -> Result<Option<PlayerStats>, HiscoresError> {
        let response = self.lookup_request(username, account_type).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!(username, %account_type, "Player not on hiscores");
                Ok(None)
            }
            status if status.is_success() => {
                let body = response.text().await?;
                let stats = parse_hiscores_csv(&body, username.trim(), account_type)?;
                Ok(Some(stats))
            }
            status => Err(HiscoresError::Status(status.as_u16())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
