use std::sync::Arc;

use axum::Router;
use base64::Engine as _;
use tempfile::TempDir;
use time::OffsetDateTime;
use tower_cookies::cookie::{Cookie, CookieJar};
use tower_cookies::Key;

use weathervane::app::{build_router, AppState};
use weathervane::auth::session::Session;
use weathervane::config::{decode_cookie_key, AppConfig, OauthCfg};
use weathervane::db::{self, DbPool};
use weathervane::provider::CurrentWeather;
use weathervane::repos::sqlite::SqliteStore;
use weathervane::web::docs;

pub struct TestDb {
    pub _dir: TempDir,
    pub path: String,
    pub pool: DbPool,
}

pub fn init_test_db() -> anyhow::Result<TestDb> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("test.sqlite");
    let path_str = db_path.display().to_string();

    let pool = db::make_pool(&path_str)?;
    {
        let mut conn = pool.get()?;
        db::run_migrations(&mut conn)?;
    }

    Ok(TestDb {
        _dir: dir,
        path: path_str,
        pool,
    })
}

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".into(),
        public_url: "http://localhost:5000".into(),
        database_url: database_url.to_string(),
        cookie_key_base64: base64::engine::general_purpose::STANDARD.encode([42u8; 64]),
        oauth: OauthCfg {
            client_id: "CLIENT".into(),
            client_secret: "SECRET".into(),
            auth_url: "https://example.com/authorize".into(),
            token_url: "https://example.com/token".into(),
            userinfo_url: "https://example.com/user".into(),
        },
        openweather_api_key: None,
        protect_weather_create: false,
    }
}

pub fn test_state(
    config: AppConfig,
    pool: DbPool,
    weather_source: Option<Arc<dyn CurrentWeather>>,
) -> AppState {
    let key_bytes = decode_cookie_key(&config.cookie_key_base64).expect("cookie key");
    let api_doc = docs::build_api_doc(&config);
    AppState {
        config,
        cookie_key: Key::from(&key_bytes),
        store: SqliteStore::new(pool),
        weather_source,
        api_doc: Arc::new(api_doc),
    }
}

pub fn build_test_app(state: AppState) -> Router {
    build_router(state)
}

/// Mints an encrypted session cookie the way the server would, so requests
/// can pass the authentication gate.
pub fn session_cookie_header(key: &Key, user_id: &str) -> String {
    let exp = OffsetDateTime::now_utc().unix_timestamp() + 3600;
    session_cookie_with_exp(key, user_id, Some(exp))
}

pub fn session_cookie_with_exp(key: &Key, user_id: &str, exp: Option<i64>) -> String {
    let session = Session {
        user_id: user_id.to_string(),
        exp,
    };
    let payload = serde_json::to_string(&session).expect("session json");
    let mut jar = CookieJar::new();
    jar.private_mut(key).add(Cookie::new("sid", payload));
    let c = jar.get("sid").expect("sid cookie");
    format!("sid={}", c.value())
}
