use press_types::TypeError;

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store rejected the service credential (HTTP 401).
    #[error(
        "remote store rejected the credential (401): check that the token is valid \
         and has Contents read/write permission on the repository"
    )]
    BadCredentials,

    /// Object creation answered 404, which the remote uses to hide
    /// repositories the token cannot write to.
    #[error(
        "remote store returned 404 on {operation}: the token has no access to \
         {owner}/{repo}, or the owner/repo names are wrong"
    )]
    RepoAccessDenied {
        operation: String,
        owner: String,
        repo: String,
    },

    /// The configured branch does not exist.
    #[error("branch {0:?} not found in the remote repository")]
    BranchNotFound(String),

    /// The branch moved since its head was read; the ref was left untouched.
    #[error("ref update on branch {branch:?} rejected: {reason}")]
    RefUpdateRejected { branch: String, reason: String },

    /// Any other non-success status. The body is kept verbatim.
    #[error("{operation} failed with status {status}: {body}")]
    Remote {
        operation: String,
        status: u16,
        body: String,
    },

    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    InvalidPath(#[from] TypeError),

    /// The client could not be configured (bad API base URL).
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Internal state failure (lock poisoning in the in-memory store).
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// `true` when the failure is a lost compare-and-swap on the branch ref.
    pub fn is_ref_conflict(&self) -> bool {
        matches!(self, Self::RefUpdateRejected { .. })
    }

    /// `true` when the service credential itself is the problem.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::BadCredentials | Self::RepoAccessDenied { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
