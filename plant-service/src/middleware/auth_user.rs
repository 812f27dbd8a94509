use crate::startup::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use plant_core::error::AppError;
use tower_sessions::Session;

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "user_id";
/// Session key holding the authenticated flag.
pub const AUTHENTICATED_KEY: &str = "authenticated";

pub(crate) fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::InternalError(anyhow::anyhow!("Session store error: {}", err))
}

/// The user behind an authenticated session.
///
/// Rejects with 401 when there is no session, it has expired, or it isn't
/// flagged as authenticated.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::InternalError(anyhow::anyhow!(msg)))?;

        let not_authenticated = || AppError::Unauthorized(anyhow::anyhow!("Not authenticated"));

        let authenticated: bool = session
            .get(AUTHENTICATED_KEY)
            .await
            .map_err(session_error)?
            .unwrap_or(false);
        if !authenticated {
            return Err(not_authenticated());
        }

        let user_id: i64 = session
            .get(USER_ID_KEY)
            .await
            .map_err(session_error)?
            .ok_or_else(not_authenticated)?;

        tracing::Span::current().record("user_id", user_id);

        Ok(AuthUser { user_id })
    }
}
