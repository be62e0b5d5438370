use runetrack_core::name_change::NameChangeThresholds;
use runetrack_core::snapshot::DEFAULT_SNAPSHOT_COOLDOWN_MINS;
use runetrack_hiscores::client::DEFAULT_BASE_URL;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Postgres URL. Without one the server runs without history.
    pub database_url: Option<String>,
    pub hiscores_base_url: String,
    /// Minimum minutes between two unforced snapshots of a player.
    pub snapshot_cooldown_mins: i64,
    pub jwt: JwtConfig,
    pub name_change: NameChangeThresholds,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                        |
    /// |--------------------------|--------------------------------|
    /// | `HOST`                   | `0.0.0.0`                      |
    /// | `PORT`                   | `3000`                         |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`        |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                           |
    /// | `DATABASE_URL`           | unset (persistence disabled)   |
    /// | `HISCORES_BASE_URL`      | `https://secure.runescape.com` |
    /// | `SNAPSHOT_COOLDOWN_MINS` | `60`                           |
    ///
    /// JWT settings come from [`JwtConfig::from_env`] and name-change limits
    /// from [`NameChangeThresholds::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let hiscores_base_url =
            std::env::var("HISCORES_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let snapshot_cooldown_mins: i64 = std::env::var("SNAPSHOT_COOLDOWN_MINS")
            .unwrap_or_else(|_| DEFAULT_SNAPSHOT_COOLDOWN_MINS.to_string())
            .parse()
            .expect("SNAPSHOT_COOLDOWN_MINS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            hiscores_base_url,
            snapshot_cooldown_mins,
            jwt: JwtConfig::from_env(),
            name_change: NameChangeThresholds::from_env(),
        }
    }
}
