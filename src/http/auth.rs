use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::http::AppError;
use crate::AppState;

const CREDENTIALS_REJECTED: &str = "Could not validate credentials";

/// The authenticated actor, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized(CREDENTIALS_REJECTED))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized(CREDENTIALS_REJECTED))?;

        let session = state
            .auth_service()
            .authenticate_access_token(token)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "failed to authenticate");
                AppError::internal("failed to authenticate")
            })?;

        let session = session.ok_or_else(|| AppError::unauthorized(CREDENTIALS_REJECTED))?;
        Ok(AuthUser {
            user_id: session.user_id,
        })
    }
}
