use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use oauth2::{AuthorizationCode, CsrfToken, Scope, TokenResponse};
use oauth2::reqwest::async_http_client;
use serde::Deserialize;
use serde_json::json;
use tower_cookies::Cookies;

use crate::app::AppState;
use crate::auth::oauth::{self, TmpAuthState};
use crate::auth::session;
use crate::models::now_rfc3339;
use crate::models::user::NewUser;
use crate::web::error::ApiError;
use crate::web::session::SessionUser;

const SESSION_TTL_MINUTES: i64 = 60 * 24;
const LOGIN_SUCCESS_PATH: &str = "/weather-data";
const LOGIN_FAILURE_PATH: &str = "/";

/// Starts the authorization-code flow: store CSRF state, redirect to the
/// provider.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response, ApiError> {
    let client = oauth::oauth_client(&state.config).map_err(|e| {
        tracing::error!(error = ?e, "failed to build oauth client");
        ApiError::Internal("Login unavailable".to_string())
    })?;

    let (auth_url, csrf_token) = client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new("read:user".to_string()))
        .url();

    let tmp = TmpAuthState {
        state: csrf_token.secret().to_string(),
    };
    oauth::write_tmp_state(&cookies, &state.cookie_key, &tmp).map_err(|e| {
        tracing::error!(error = ?e, "failed to store oauth state");
        ApiError::Internal("Login unavailable".to_string())
    })?;

    Ok(Redirect::temporary(auth_url.as_str()).into_response())
}

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(q): Query<AuthCallbackQuery>,
) -> impl IntoResponse {
    match complete_login(&state, &cookies, q).await {
        Ok(redirect) => redirect.into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "oauth callback failed");
            Redirect::temporary(LOGIN_FAILURE_PATH).into_response()
        }
    }
}

async fn complete_login(
    state: &AppState,
    cookies: &Cookies,
    q: AuthCallbackQuery,
) -> anyhow::Result<Redirect> {
    if let Some(err) = q.error {
        return Err(anyhow::anyhow!("provider error: {}", err));
    }
    let code = q.code.ok_or_else(|| anyhow::anyhow!("missing code"))?;
    let state_param = q.state.ok_or_else(|| anyhow::anyhow!("missing state"))?;

    let tmp = oauth::take_tmp_state(cookies, &state.cookie_key)?
        .ok_or_else(|| anyhow::anyhow!("missing stored auth state"))?;
    if tmp.state != state_param {
        return Err(anyhow::anyhow!("state mismatch"));
    }

    let client = oauth::oauth_client(&state.config)?;
    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(async_http_client)
        .await?;

    let profile =
        oauth::fetch_profile(&state.config.oauth.userinfo_url, token.access_token().secret())
            .await?;

    let user = state
        .store
        .find_or_create_user(NewUser {
            id: uuid::Uuid::new_v4().to_string(),
            oauth_id: profile.oauth_id,
            username: profile.username,
            email: profile.email,
            created_at: now_rfc3339(),
        })
        .await?;

    session::set_session(cookies, &state.cookie_key, &user.id, SESSION_TTL_MINUTES);
    Ok(Redirect::temporary(LOGIN_SUCCESS_PATH))
}

pub async fn logout(
    _user: SessionUser,
    State(state): State<AppState>,
    cookies: Cookies,
) -> impl IntoResponse {
    session::clear_session(&cookies, &state.cookie_key);
    Json(json!({ "message": "Successfully logged out" }))
}
