use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use chrono::Utc;
use press_auth::{cookie_value, SessionClaims, SESSION_COOKIE};
use tracing::debug;

use crate::error::ServerError;
use crate::state::AppState;

/// A verified admin session. Taking this as a handler argument rejects the
/// request with 401 before any body is read.
#[derive(Clone, Copy, Debug)]
pub struct AdminSession {
    pub claims: SessionClaims,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|header| cookie_value(header, SESSION_COOKIE))
            .ok_or(ServerError::Unauthorized)?;

        let claims = state.signer().verify(token, Utc::now()).map_err(|err| {
            debug!(error = %err, "session rejected");
            ServerError::Unauthorized
        })?;
        Ok(Self { claims })
    }
}
