use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::auth::session;
use crate::config::AppConfig;

const TMP_COOKIE: &str = "oauth_tmp";
const USER_AGENT: &str = "weathervane";

/// CSRF state held in a private cookie between /auth and /auth/callback.
#[derive(Debug, Serialize, Deserialize)]
pub struct TmpAuthState {
    pub state: String,
}

pub fn oauth_client(cfg: &AppConfig) -> anyhow::Result<BasicClient> {
    let auth_url = AuthUrl::new(cfg.oauth.auth_url.clone())?;
    let token_url = TokenUrl::new(cfg.oauth.token_url.clone())?;
    let redirect = RedirectUrl::new(format!(
        "{}/auth/callback",
        cfg.public_url.trim_end_matches('/')
    ))?;
    let client = BasicClient::new(
        ClientId::new(cfg.oauth.client_id.clone()),
        Some(ClientSecret::new(cfg.oauth.client_secret.clone())),
        auth_url,
        Some(token_url),
    )
    .set_redirect_uri(redirect);
    Ok(client)
}

pub fn write_tmp_state(
    cookies: &Cookies,
    key: &tower_cookies::Key,
    v: &TmpAuthState,
) -> anyhow::Result<()> {
    let payload = serde_json::to_string(v)?;
    let mut c = tower_cookies::Cookie::new(TMP_COOKIE, payload);
    c.set_path("/");
    c.set_http_only(true);
    c.set_same_site(tower_cookies::cookie::SameSite::Lax);
    c.set_secure(session::is_https());
    c.set_max_age(time::Duration::minutes(10));
    cookies.private(key).add(c);
    Ok(())
}

pub fn take_tmp_state(
    cookies: &Cookies,
    key: &tower_cookies::Key,
) -> anyhow::Result<Option<TmpAuthState>> {
    if let Some(c) = cookies.private(key).get(TMP_COOKIE) {
        let v: TmpAuthState = serde_json::from_str(c.value())?;
        cookies.private(key).remove(c);
        return Ok(Some(v));
    }
    Ok(None)
}

/// Identity fields extracted from the provider's userinfo response.
#[derive(Debug, Clone)]
pub struct Profile {
    pub oauth_id: String,
    pub username: String,
    pub email: Option<String>,
}

/// Fetches the authenticated profile. Accepts GitHub's shape (`id`, `login`)
/// as well as the OIDC-style `sub`/`name` fields.
pub async fn fetch_profile(userinfo_url: &str, access_token: &str) -> anyhow::Result<Profile> {
    let client = reqwest::Client::new();
    let info: serde_json::Value = client
        .get(userinfo_url)
        .bearer_auth(access_token)
        .header("User-Agent", USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let oauth_id = info
        .get("id")
        .and_then(|v| v.as_i64().map(|n| n.to_string()).or_else(|| v.as_str().map(String::from)))
        .or_else(|| info.get("sub").and_then(|v| v.as_str()).map(String::from))
        .ok_or_else(|| anyhow::anyhow!("userinfo missing subject id"))?;

    let username = info
        .get("login")
        .or_else(|| info.get("name"))
        .or_else(|| info.get("preferred_username"))
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| anyhow::anyhow!("userinfo missing username"))?;

    let email = info
        .get("email")
        .and_then(|v| v.as_str())
        .map(String::from);

    Ok(Profile {
        oauth_id,
        username,
        email,
    })
}
