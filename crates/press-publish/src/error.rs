use std::fmt;

use press_article::ArticleError;
use press_commit::CommitError;
use press_images::ImageError;
use press_store::StoreError;
use press_types::ArticleSlug;
use tracing::warn;

/// Why a mutation conflicted with the current state of the branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// `create` found an article at the derived slug.
    AlreadyExists,
    /// Another commit landed between reading the head and moving the branch.
    RefRace,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => f.write_str("an article with this slug already exists"),
            Self::RefRace => {
                f.write_str("the content branch changed while saving, please retry")
            }
        }
    }
}

/// Errors from article operations.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Rejected before any remote write.
    #[error("{0}")]
    MalformedInput(String),

    #[error("article not found: {slug}")]
    NotFound { slug: String },

    #[error("{kind} ({slug})")]
    Conflict { slug: String, kind: ConflictKind },

    /// The content store refused the service credential.
    #[error("{0}")]
    RemoteAuthFailure(#[source] StoreError),

    /// Any other remote failure; the remote message is kept for operators.
    #[error("content store error: {0}")]
    RemoteUnavailable(#[source] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PublishError {
    pub(crate) fn not_found(slug: &ArticleSlug) -> Self {
        Self::NotFound {
            slug: slug.to_string(),
        }
    }

    pub(crate) fn conflict(slug: &ArticleSlug, kind: ConflictKind) -> Self {
        Self::Conflict {
            slug: slug.to_string(),
            kind,
        }
    }

    /// Map a commit failure, turning a lost ref race into a conflict.
    pub(crate) fn from_commit(err: CommitError, slug: &ArticleSlug) -> Self {
        match err {
            CommitError::InvalidChangeSet(reason) => Self::MalformedInput(reason),
            CommitError::Store { source, .. } if source.is_ref_conflict() => {
                Self::conflict(slug, ConflictKind::RefRace)
            }
            CommitError::Store { stage, source } => {
                warn!(%slug, %stage, error = %source, "commit failed");
                Self::from(source)
            }
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// `Some` when the failure is a conflict, naming which kind.
    pub fn conflict_kind(&self) -> Option<ConflictKind> {
        match self {
            Self::Conflict { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<StoreError> for PublishError {
    fn from(err: StoreError) -> Self {
        if err.is_auth_failure() {
            return Self::RemoteAuthFailure(err);
        }
        match err {
            StoreError::InvalidPath(inner) => Self::MalformedInput(inner.to_string()),
            StoreError::Internal(reason) => Self::Internal(reason),
            other => Self::RemoteUnavailable(other),
        }
    }
}

impl From<ArticleError> for PublishError {
    fn from(err: ArticleError) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

impl From<ImageError> for PublishError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Pattern(inner) => Self::Internal(inner.to_string()),
            other => Self::MalformedInput(other.to_string()),
        }
    }
}

pub type PublishResult<T> = Result<T, PublishError>;
