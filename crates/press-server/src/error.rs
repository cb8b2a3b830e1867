use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use press_auth::AuthError;
use press_publish::PublishError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// No valid admin session.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("too many login attempts, retry in {retry_after} seconds")]
    TooManyAttempts { retry_after: u64 },

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Shown to public readers instead of any remote detail.
    #[error("articles are temporarily unavailable")]
    Unavailable,

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::TooManyAttempts { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Publish(err) => match err {
                PublishError::MalformedInput(_) => StatusCode::BAD_REQUEST,
                PublishError::NotFound { .. } => StatusCode::NOT_FOUND,
                PublishError::Conflict { .. } => StatusCode::CONFLICT,
                PublishError::RemoteAuthFailure(_) | PublishError::RemoteUnavailable(_) => {
                    StatusCode::BAD_GATEWAY
                }
                PublishError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Auth(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if let Self::TooManyAttempts { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
