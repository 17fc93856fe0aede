use base64::Engine as _;
use rand::RngCore;

/// OAuth2 provider endpoints and credentials. Defaults point at GitHub,
/// matching the deployed configuration; any authorization-code provider
/// with a bearer-token userinfo endpoint works.
#[derive(Debug, Clone)]
pub struct OauthCfg {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub public_url: String,
    pub database_url: String,
    /// Base64-encoded 32- or 64-byte key used to encrypt session cookies.
    pub cookie_key_base64: String,
    pub oauth: OauthCfg,
    /// When absent, GET /weather/{city} returns 404 on a local miss instead
    /// of fetching from OpenWeather.
    pub openweather_api_key: Option<String>,
    /// Whether POST /weather requires an authenticated session.
    pub protect_weather_create: bool,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let bind_addr = env_or("APP_BIND_ADDR", &default_bind_addr());
        let public_url = env_or("APP_PUBLIC_URL", &format!("http://{}", bind_addr));

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let cookie_key_base64 = match std::env::var("COOKIE_KEY_BASE64") {
            Ok(v) if !v.is_empty() => v,
            _ => {
                let mut key = [0u8; 64];
                rand::rngs::OsRng.fill_bytes(&mut key);
                tracing::warn!(
                    "COOKIE_KEY_BASE64 not provided; generated a temporary dev key. \
                     Sessions will be invalidated on restart."
                );
                base64::engine::general_purpose::STANDARD.encode(key)
            }
        };

        let oauth = OauthCfg {
            client_id: env_or("OAUTH_CLIENT_ID", ""),
            client_secret: env_or("OAUTH_CLIENT_SECRET", ""),
            auth_url: env_or("OAUTH_AUTH_URL", "https://github.com/login/oauth/authorize"),
            token_url: env_or("OAUTH_TOKEN_URL", "https://github.com/login/oauth/access_token"),
            userinfo_url: env_or("OAUTH_USERINFO_URL", "https://api.github.com/user"),
        };

        let openweather_api_key = std::env::var("OPENWEATHER_API_KEY")
            .ok()
            .filter(|v| !v.is_empty());

        let protect_weather_create = matches!(
            std::env::var("PROTECT_WEATHER_CREATE").as_deref(),
            Ok("1") | Ok("true") | Ok("yes")
        );

        Ok(AppConfig {
            bind_addr,
            public_url,
            database_url,
            cookie_key_base64,
            oauth,
            openweather_api_key,
            protect_weather_create,
        })
    }
}

/// tower-cookies expects a 64-byte key for the private jar (32 for signing
/// plus 32 for encryption). A 32-byte key is accepted and doubled up.
pub fn decode_cookie_key(b64: &str) -> anyhow::Result<[u8; 64]> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid COOKIE_KEY_BASE64: {}", e))?;
    let mut out = [0u8; 64];
    match bytes.len() {
        32 => {
            out[..32].copy_from_slice(&bytes);
            out[32..].copy_from_slice(&bytes);
        }
        64 => out.copy_from_slice(&bytes),
        n => {
            return Err(anyhow::anyhow!(
                "COOKIE_KEY_BASE64 must decode to 32 or 64 bytes, got {}",
                n
            ))
        }
    }
    Ok(out)
}
