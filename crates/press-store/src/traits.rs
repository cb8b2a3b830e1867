use async_trait::async_trait;
use bytes::Bytes;
use press_types::{EntryKind, EntryMode, ObjectHash};

use crate::error::{StoreError, StoreResult};

/// A file read from the tip of the branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteFile {
    pub hash: ObjectHash,
    pub content: Bytes,
}

impl RemoteFile {
    /// Content as UTF-8 text.
    pub fn text(&self) -> StoreResult<String> {
        String::from_utf8(self.content.to_vec())
            .map_err(|e| StoreError::Decode(format!("file is not valid UTF-8: {e}")))
    }
}

/// One immediate child of a listed directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub hash: ObjectHash,
    pub kind: EntryKind,
}

/// One entry of a sparse tree delta. `hash: None` deletes the path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub mode: EntryMode,
    pub hash: Option<ObjectHash>,
}

impl TreeEntry {
    pub fn upsert(path: impl Into<String>, mode: EntryMode, hash: ObjectHash) -> Self {
        Self {
            path: path.into(),
            mode,
            hash: Some(hash),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: EntryMode::Regular,
            hash: None,
        }
    }

    pub fn is_deletion(&self) -> bool {
        self.hash.is_none()
    }
}

/// Remote content store bound to one repository branch.
///
/// Invariants every implementation upholds:
/// - Reads observe the tip of the branch at the time of the call.
/// - A path (or directory) that does not exist is `Ok(None)`.
/// - Blobs, trees and commits are immutable; creating them never changes
///   what readers of the branch see.
/// - [`update_branch`](ContentStore::update_branch) is the only mutation
///   visible to readers, and it succeeds only as a fast-forward.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Name of the branch this store reads and writes.
    fn branch(&self) -> &str;

    /// Hash of the file at `path`, or `None` if absent.
    async fn file_exists(&self, path: &str) -> StoreResult<Option<ObjectHash>>;

    /// Decoded content of the file at `path`, or `None` if absent.
    async fn read_file(&self, path: &str) -> StoreResult<Option<RemoteFile>>;

    /// Immediate children of the directory at `path`, or `None` if absent.
    async fn list_directory(&self, path: &str) -> StoreResult<Option<Vec<DirEntry>>>;

    /// Commit the branch currently points at.
    async fn branch_head(&self) -> StoreResult<ObjectHash>;

    /// Root tree of `commit`.
    async fn commit_tree(&self, commit: &ObjectHash) -> StoreResult<ObjectHash>;

    /// Store `content` as a blob and return its hash.
    async fn create_blob(&self, content: &[u8]) -> StoreResult<ObjectHash>;

    /// Apply `entries` on top of `base_tree` and return the new tree's hash.
    async fn create_tree(
        &self,
        base_tree: &ObjectHash,
        entries: &[TreeEntry],
    ) -> StoreResult<ObjectHash>;

    /// Create a commit with a single parent.
    async fn create_commit(
        &self,
        message: &str,
        tree: &ObjectHash,
        parent: &ObjectHash,
    ) -> StoreResult<ObjectHash>;

    /// Move the branch to `commit`. Never forced: fails with
    /// [`StoreError::RefUpdateRejected`] unless it is a fast-forward.
    async fn update_branch(&self, commit: &ObjectHash) -> StoreResult<()>;
}
