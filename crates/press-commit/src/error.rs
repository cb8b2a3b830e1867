use std::fmt;

use press_store::StoreError;

/// The step of the commit sequence that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitStage {
    ResolveHead,
    ResolveBaseTree,
    CreateBlobs,
    CreateTree,
    CreateCommit,
    UpdateRef,
}

impl fmt::Display for CommitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ResolveHead => "resolving branch head",
            Self::ResolveBaseTree => "resolving base tree",
            Self::CreateBlobs => "creating blobs",
            Self::CreateTree => "creating tree",
            Self::CreateCommit => "creating commit",
            Self::UpdateRef => "updating branch",
        };
        f.write_str(label)
    }
}

/// Errors from building a commit.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// The change set was rejected before any remote call.
    #[error("invalid change set: {0}")]
    InvalidChangeSet(String),

    /// A remote step failed. Unless `stage` is [`CommitStage::UpdateRef`]
    /// the branch was not touched.
    #[error("{stage} failed: {source}")]
    Store {
        stage: CommitStage,
        #[source]
        source: StoreError,
    },
}

impl CommitError {
    /// `true` when the branch moved underneath us.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store { source, .. } if source.is_ref_conflict())
    }

    pub fn stage(&self) -> Option<CommitStage> {
        match self {
            Self::Store { stage, .. } => Some(*stage),
            Self::InvalidChangeSet(_) => None,
        }
    }

    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Store { source, .. } => Some(source),
            Self::InvalidChangeSet(_) => None,
        }
    }
}

pub type CommitResult<T> = Result<T, CommitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_only_for_ref_rejection() {
        let race = CommitError::Store {
            stage: CommitStage::UpdateRef,
            source: StoreError::RefUpdateRejected {
                branch: "main".into(),
                reason: "Update is not a fast forward".into(),
            },
        };
        assert!(race.is_conflict());
        assert_eq!(race.stage(), Some(CommitStage::UpdateRef));
        assert!(race.to_string().starts_with("updating branch failed"));

        let other = CommitError::Store {
            stage: CommitStage::CreateTree,
            source: StoreError::BadCredentials,
        };
        assert!(!other.is_conflict());
        assert!(other.store_error().is_some_and(StoreError::is_auth_failure));

        let invalid = CommitError::InvalidChangeSet("empty".into());
        assert_eq!(invalid.stage(), None);
        assert!(!invalid.is_conflict());
    }
}
