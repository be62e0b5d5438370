#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use runetrack_api::auth::jwt::{generate_access_token, JwtConfig};
use runetrack_api::config::ServerConfig;
use runetrack_api::router::build_app_router;
use runetrack_api::state::AppState;
use runetrack_core::experience::level_for_xp;
use runetrack_core::name_change::NameChangeThresholds;
use runetrack_core::skills::Skill;
use runetrack_core::stats::{normalize_username, AccountType, BossStats, PlayerStats, SkillStats};
use runetrack_db::{MemoryStore, PlayerStore, UnavailableStore};
use runetrack_events::EventBus;
use runetrack_hiscores::{HiscoresError, HiscoresSource};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Fake hiscores
// ---------------------------------------------------------------------------

/// In-memory hiscores keyed by normalised username and account type.
#[derive(Default)]
pub struct FakeHiscores {
    listed: Mutex<HashMap<(String, AccountType), PlayerStats>>,
}

impl FakeHiscores {
    /// List `stats` on the normal hiscores.
    pub fn list(&self, stats: PlayerStats) {
        self.list_as(AccountType::Normal, stats);
    }

    pub fn list_as(&self, account_type: AccountType, stats: PlayerStats) {
        let key = (normalize_username(&stats.username), account_type);
        self.listed.lock().unwrap().insert(key, stats);
    }

    pub fn unlist(&self, username: &str) {
        let key = normalize_username(username);
        self.listed.lock().unwrap().retain(|(name, _), _| *name != key);
    }
}

#[async_trait]
impl HiscoresSource for FakeHiscores {
    async fn fetch(
        &self,
        username: &str,
        account_type: AccountType,
    ) -> Result<Option<PlayerStats>, HiscoresError> {
        let key = (normalize_username(username), account_type);
        Ok(self.listed.lock().unwrap().get(&key).cloned())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Every skill at `xp_per_skill`, plus the given boss kill counts.
pub fn stats(username: &str, xp_per_skill: i64, bosses: &[(&str, i64)]) -> PlayerStats {
    let skills = Skill::ALL
        .iter()
        .map(|&skill| {
            (
                skill,
                SkillStats {
                    level: level_for_xp(xp_per_skill),
                    xp: xp_per_skill,
                    rank: Some(50_000),
                },
            )
        })
        .collect();
    let bosses: BTreeMap<String, BossStats> = bosses
        .iter()
        .map(|&(name, kill_count)| {
            (
                name.to_string(),
                BossStats {
                    kill_count,
                    rank: None,
                },
            )
        })
        .collect();
    PlayerStats::new(username, AccountType::Normal, None, skills, bosses)
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        hiscores_base_url: "http://hiscores.invalid".to_string(),
        snapshot_cooldown_mins: 60,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
        name_change: NameChangeThresholds::default(),
    }
}

/// A router plus handles on everything behind it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub hiscores: Arc<FakeHiscores>,
    pub event_bus: Arc<EventBus>,
    pub config: ServerConfig,
}

impl TestApp {
    pub fn token(&self) -> String {
        generate_access_token(1, &self.config.jwt).unwrap()
    }
}

/// Build the full application router over a [`MemoryStore`] and
/// [`FakeHiscores`].
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let hiscores = Arc::new(FakeHiscores::default());
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        store: store.clone(),
        hiscores: hiscores.clone(),
        event_bus: event_bus.clone(),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        hiscores,
        event_bus,
        config,
    }
}

/// Router without persistence, as when `DATABASE_URL` is unset.
pub fn build_unpersisted_app(hiscores: Arc<FakeHiscores>) -> Router {
    let config = test_config();
    let store: Arc<dyn PlayerStore> = Arc::new(UnavailableStore);
    let state = AppState {
        store,
        hiscores,
        event_bus: Arc::new(EventBus::default()),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
