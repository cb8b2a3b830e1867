use thiserror::Error;

/// Errors produced by type construction and validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object hash {value:?}: {reason}")]
    InvalidHash { value: String, reason: String },

    #[error("invalid repository path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid slug {value:?}: must match ^[a-z0-9]+(-[a-z0-9]+)*$")]
    InvalidSlug { value: String },

    #[error("unknown entry mode: {0}")]
    UnknownMode(String),
}
