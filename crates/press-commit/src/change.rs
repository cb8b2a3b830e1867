use std::collections::HashSet;

use bytes::Bytes;
use press_types::{validate_repo_path, EntryMode, ObjectHash};
use press_store::TreeEntry;

use crate::error::{CommitError, CommitResult};

/// A file to create or overwrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub content: Bytes,
    pub mode: EntryMode,
}

impl FileChange {
    pub fn new(path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode: EntryMode::Regular,
        }
    }
}

/// A path to remove from the tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeletionMarker {
    pub path: String,
}

impl DeletionMarker {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Everything that goes into one commit.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    message: String,
    writes: Vec<FileChange>,
    deletions: Vec<DeletionMarker>,
}

impl ChangeSet {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn write(mut self, path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        self.writes.push(FileChange::new(path, content));
        self
    }

    pub fn write_executable(mut self, path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        self.writes.push(FileChange {
            mode: EntryMode::Executable,
            ..FileChange::new(path, content)
        });
        self
    }

    pub fn delete(mut self, path: impl Into<String>) -> Self {
        self.deletions.push(DeletionMarker::new(path));
        self
    }

    pub fn push_write(&mut self, change: FileChange) {
        self.writes.push(change);
    }

    pub fn push_deletion(&mut self, marker: DeletionMarker) {
        self.deletions.push(marker);
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn writes(&self) -> &[FileChange] {
        &self.writes
    }

    pub fn deletions(&self) -> &[DeletionMarker] {
        &self.deletions
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.deletions.is_empty()
    }

    /// Check the set before anything is sent to the store.
    ///
    /// Rejects an empty message, an empty set, invalid paths, a path
    /// written or deleted twice, and a path both written and deleted.
    pub fn validate(&self) -> CommitResult<()> {
        if self.message.trim().is_empty() {
            return Err(CommitError::InvalidChangeSet(
                "commit message must not be empty".into(),
            ));
        }
        if self.is_empty() {
            return Err(CommitError::InvalidChangeSet(
                "nothing to commit: no writes and no deletions".into(),
            ));
        }

        let mut written = HashSet::new();
        for change in &self.writes {
            validate_repo_path(&change.path)
                .map_err(|e| CommitError::InvalidChangeSet(e.to_string()))?;
            if !written.insert(change.path.as_str()) {
                return Err(CommitError::InvalidChangeSet(format!(
                    "{} is written more than once",
                    change.path
                )));
            }
        }

        let mut deleted = HashSet::new();
        for marker in &self.deletions {
            validate_repo_path(&marker.path)
                .map_err(|e| CommitError::InvalidChangeSet(e.to_string()))?;
            if !deleted.insert(marker.path.as_str()) {
                return Err(CommitError::InvalidChangeSet(format!(
                    "{} is deleted more than once",
                    marker.path
                )));
            }
            if written.contains(marker.path.as_str()) {
                return Err(CommitError::InvalidChangeSet(format!(
                    "{} is both written and deleted",
                    marker.path
                )));
            }
        }
        Ok(())
    }

    /// The sparse tree delta: one entry per write (paired positionally with
    /// `blobs`) followed by one hash-less entry per deletion.
    pub(crate) fn tree_entries(&self, blobs: Vec<ObjectHash>) -> Vec<TreeEntry> {
        self.writes
            .iter()
            .zip(blobs)
            .map(|(change, hash)| TreeEntry::upsert(change.path.clone(), change.mode, hash))
            .chain(
                self.deletions
                    .iter()
                    .map(|marker| TreeEntry::delete(marker.path.clone())),
            )
            .collect()
    }
}
