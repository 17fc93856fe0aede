use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tower_cookies::{Cookie, Cookies};

pub const SESSION_COOKIE: &str = "sid";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub exp: Option<i64>, // unix seconds
}

pub fn get_session(cookies: &Cookies, key: &tower_cookies::Key) -> Option<Session> {
    let c = cookies.private(key).get(SESSION_COOKIE)?;
    let session: Session = serde_json::from_str(c.value()).ok()?;
    if let Some(exp) = session.exp {
        if OffsetDateTime::now_utc().unix_timestamp() > exp {
            return None;
        }
    }
    Some(session)
}

pub fn set_session(cookies: &Cookies, key: &tower_cookies::Key, user_id: &str, ttl_minutes: i64) {
    let exp = OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes);
    let s = Session {
        user_id: user_id.to_string(),
        exp: Some(exp.unix_timestamp()),
    };
    if let Ok(payload) = serde_json::to_string(&s) {
        let mut cookie = Cookie::new(SESSION_COOKIE, payload);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
        cookie.set_secure(is_https());
        cookie.set_max_age(Duration::minutes(ttl_minutes));
        cookies.private(key).add(cookie);
    }
}

/// Instructs the client to drop the session cookie. Sessions are stateless
/// encrypted cookies, so a captured `sid` value stays decryptable until its
/// `exp` passes; there is no server-side revocation list.
pub fn clear_session(cookies: &Cookies, key: &tower_cookies::Key) {
    let mut base = Cookie::new(SESSION_COOKIE, "");
    base.set_path("/");
    cookies.remove(base.clone());
    cookies.private(key).remove(base);
}

pub(crate) fn is_https() -> bool {
    // Environment hint; default to false for local dev
    matches!(
        std::env::var("APP_FORCE_SECURE").as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}
