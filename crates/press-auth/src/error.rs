/// Errors from session handling and attempt tracking.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("malformed session token")]
    Malformed,

    #[error("session signature mismatch")]
    BadSignature,

    #[error("session expired")]
    Expired,

    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),

    #[error("attempt store error: {0}")]
    Store(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
