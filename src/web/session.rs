use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::future::Future;
use tower_cookies::Cookies;

use crate::app::AppState;
use crate::auth::session;
use crate::web::error::ApiError;

/// Extractor for routes behind the authentication gate. Resolves the private
/// session cookie to a user id or rejects with 401 before the handler runs.
pub struct SessionUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let cookies = Cookies::from_request_parts(parts, state).await.map_err(|e| {
                tracing::error!(error = ?e, "failed to extract cookies");
                ApiError::Unauthorized
            })?;

            match session::get_session(&cookies, &state.cookie_key) {
                Some(s) => Ok(SessionUser { user_id: s.user_id }),
                None => Err(ApiError::Unauthorized),
            }
        }
    }
}
