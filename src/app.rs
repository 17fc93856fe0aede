use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::{decode_cookie_key, AppConfig};
use crate::provider::{CurrentWeather, OpenWeatherClient};
use crate::repos::sqlite::SqliteStore;
use crate::repos::Store;
use crate::web::{docs, handlers};

const API_DOC_FILE: &str = "openapi.json";

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub cookie_key: Key,
    pub store: Arc<dyn Store>,
    /// Absent when no OpenWeather key is configured; GET /weather/{city}
    /// then 404s on a local miss.
    pub weather_source: Option<Arc<dyn CurrentWeather>>,
    pub api_doc: Arc<serde_json::Value>,
}

pub async fn run() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .try_init();

    let config = AppConfig::from_env()?;
    let key_bytes = decode_cookie_key(&config.cookie_key_base64)?;
    let cookie_key = Key::from(&key_bytes);

    let pool = crate::db::make_pool(&config.database_url)?;
    {
        let mut conn = pool.get()?;
        crate::db::run_migrations(&mut conn)?;
    }

    let store: Arc<dyn Store> = SqliteStore::new(pool);
    let weather_source: Option<Arc<dyn CurrentWeather>> = config
        .openweather_api_key
        .clone()
        .map(|key| Arc::new(OpenWeatherClient::new(key)) as Arc<dyn CurrentWeather>);

    let api_doc = docs::build_api_doc(&config);
    if let Err(e) = docs::write_api_doc(&api_doc, API_DOC_FILE) {
        tracing::warn!(error = ?e, "failed to write {}", API_DOC_FILE);
    }

    let state = AppState {
        config: config.clone(),
        cookie_key,
        store,
        weather_source,
        api_doc: Arc::new(api_doc),
    };

    let app = build_router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let addr = config.bind_addr.clone();
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/weather",
            post(handlers::weather::create).get(handlers::weather::list),
        )
        .route("/weather/{city}", get(handlers::weather::get_by_city))
        .route("/weather/update/{city}", put(handlers::weather::update))
        .route("/weather/delete/{city}", delete(handlers::weather::delete))
        .route("/weather-data", get(handlers::weather::list_secure))
        .route(
            "/api/location",
            post(handlers::location::create).get(handlers::location::list),
        )
        .route(
            "/api/location/{city}",
            get(handlers::location::get_by_city)
                .put(handlers::location::update)
                .delete(handlers::location::delete),
        )
        .route("/auth", get(handlers::auth::login))
        .route("/auth/callback", get(handlers::auth::callback))
        .route("/logout", get(handlers::auth::logout))
        .route("/api-docs", get(docs::serve))
        .with_state(state)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
