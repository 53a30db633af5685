use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::warn;

use crate::error::WebError;
use crate::session::COOKIE_NAME;
use crate::state::AppState;

/// The logged-in user behind the request's session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub session_id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let json = parts.uri.path().starts_with("/api/");
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(session_id) = jar.get(COOKIE_NAME).map(|c| c.value().to_string()) else {
            return Err(WebError::Unauthorized { json });
        };

        let Some(session) = state.sessions.get(&session_id).await? else {
            return Err(WebError::Unauthorized { json });
        };

        // Sessions of deactivated or deleted users are dropped on next use.
        match state.users.find_by_id(session.user_id).await? {
            Some(user) if user.is_active => Ok(AuthUser {
                user_id: user.id,
                username: user.username,
                session_id,
            }),
            _ => {
                warn!(user_id = session.user_id, "Session belongs to an inactive user");
                state.sessions.delete(&session_id).await?;
                Err(WebError::Unauthorized { json })
            }
        }
    }
}
