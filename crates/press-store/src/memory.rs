//! In-memory content store for tests and local runs.
//!
//! [`InMemoryContentStore`] models the remote faithfully enough to exercise
//! the commit builder end to end: content-addressed blobs, flat tree
//! snapshots (path → blob), single-parent commits and one branch ref that
//! only moves by fast-forward. Data is lost when the store is dropped.
//!
//! Two testing aids are built in:
//!
//! - [`fail_on`](InMemoryContentStore::fail_on) makes a remote step fail with
//!   a 500 until [`clear_failures`](InMemoryContentStore::clear_failures).
//! - [`with_ref_update_barrier`](InMemoryContentStore::with_ref_update_barrier)
//!   parks every ref update on a shared barrier, so concurrent writers reach
//!   the compare-and-swap together.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;
use press_types::{validate_repo_path, EntryKind, EntryMode, ObjectHash};
use tokio::sync::Barrier;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, DirEntry, RemoteFile, TreeEntry};

/// A remote call, as seen by fault injection and the call log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteStep {
    ReadContents,
    BranchHead,
    CommitTree,
    CreateBlob,
    CreateTree,
    CreateCommit,
    UpdateBranch,
}

impl fmt::Display for RemoteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ReadContents => "read contents",
            Self::BranchHead => "read ref",
            Self::CommitTree => "read commit",
            Self::CreateBlob => "create blob",
            Self::CreateTree => "create tree",
            Self::CreateCommit => "create commit",
            Self::UpdateBranch => "update ref",
        };
        f.write_str(label)
    }
}

type Snapshot = BTreeMap<String, (EntryMode, ObjectHash)>;

#[derive(Debug)]
struct StoredCommit {
    tree: ObjectHash,
    parent: Option<ObjectHash>,
    message: String,
}

#[derive(Debug)]
struct State {
    blobs: HashMap<ObjectHash, Bytes>,
    trees: HashMap<ObjectHash, Snapshot>,
    commits: HashMap<ObjectHash, StoredCommit>,
    head: ObjectHash,
    sequence: u64,
}

impl State {
    fn empty() -> Self {
        let empty = Snapshot::new();
        let tree = tree_hash(&empty);
        let mut state = Self {
            blobs: HashMap::new(),
            trees: HashMap::from([(tree.clone(), empty)]),
            commits: HashMap::new(),
            head: tree.clone(),
            sequence: 0,
        };
        state.head = state.insert_commit("Initial commit", tree, None);
        state
    }

    fn insert_blob(&mut self, content: &[u8]) -> ObjectHash {
        let hash = blob_hash(content);
        self.blobs
            .entry(hash.clone())
            .or_insert_with(|| Bytes::copy_from_slice(content));
        hash
    }

    fn insert_tree(&mut self, snapshot: Snapshot) -> ObjectHash {
        let hash = tree_hash(&snapshot);
        self.trees.entry(hash.clone()).or_insert(snapshot);
        hash
    }

    fn insert_commit(
        &mut self,
        message: &str,
        tree: ObjectHash,
        parent: Option<ObjectHash>,
    ) -> ObjectHash {
        self.sequence += 1;
        let hash = commit_hash(&tree, parent.as_ref(), self.sequence, message);
        self.commits.insert(
            hash.clone(),
            StoredCommit {
                tree,
                parent,
                message: message.to_string(),
            },
        );
        hash
    }

    fn head_snapshot(&self) -> StoreResult<&Snapshot> {
        let commit = self
            .commits
            .get(&self.head)
            .ok_or_else(|| StoreError::Internal(format!("head {} is dangling", self.head)))?;
        self.trees
            .get(&commit.tree)
            .ok_or_else(|| StoreError::Internal(format!("tree {} is dangling", commit.tree)))
    }

    /// `true` if `ancestor` is `commit` or reachable through its parents.
    fn descends_from(&self, commit: &ObjectHash, ancestor: &ObjectHash) -> bool {
        let mut cursor = Some(commit);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.commits.get(current).and_then(|c| c.parent.as_ref());
        }
        false
    }

    /// Land a commit on top of head directly, bypassing the ref CAS.
    fn apply_seed(&mut self, message: &str, files: Vec<(String, Bytes)>) -> StoreResult<ObjectHash> {
        let mut snapshot = self.head_snapshot()?.clone();
        for (path, content) in files {
            let hash = self.insert_blob(&content);
            snapshot.insert(path, (EntryMode::Regular, hash));
        }
        let tree = self.insert_tree(snapshot);
        let parent = self.head.clone();
        let commit = self.insert_commit(message, tree, Some(parent));
        self.head = commit.clone();
        Ok(commit)
    }
}

/// An in-memory implementation of [`ContentStore`].
#[derive(Debug)]
pub struct InMemoryContentStore {
    branch: String,
    state: RwLock<State>,
    failures: RwLock<HashSet<RemoteStep>>,
    calls: Mutex<Vec<RemoteStep>>,
    ref_barrier: Option<Arc<Barrier>>,
}

impl InMemoryContentStore {
    /// A store whose branch points at a single empty root commit.
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            state: RwLock::new(State::empty()),
            failures: RwLock::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            ref_barrier: None,
        }
    }

    /// Seed the branch with `files` in one commit.
    pub fn with_files<I, P, B>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<String>,
        B: AsRef<[u8]>,
    {
        let files = collect_files(files);
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        // A freshly built state always has a resolvable head.
        if let Err(err) = state.apply_seed("Seed content", files) {
            tracing::error!(%err, "seeding in-memory store failed");
        }
        self
    }

    /// Park every ref update on `barrier` before the compare-and-swap.
    pub fn with_ref_update_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.ref_barrier = Some(barrier);
        self
    }

    /// Land a commit written by "someone else": head moves without going
    /// through [`ContentStore::update_branch`].
    pub fn seed_commit<I, P, B>(&self, message: &str, files: I) -> StoreResult<ObjectHash>
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<String>,
        B: AsRef<[u8]>,
    {
        let files = collect_files(files);
        self.write_state()?.apply_seed(message, files)
    }

    /// Make every future call of `step` fail with a 500.
    pub fn fail_on(&self, step: RemoteStep) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(step);
    }

    pub fn clear_failures(&self) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Every remote step invoked so far, in call order.
    pub fn calls(&self) -> Vec<RemoteStep> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn head(&self) -> StoreResult<ObjectHash> {
        Ok(self.read_state()?.head.clone())
    }

    pub fn file_at_head(&self, path: &str) -> StoreResult<Option<Bytes>> {
        let state = self.read_state()?;
        let snapshot = state.head_snapshot()?;
        Ok(snapshot
            .get(path)
            .and_then(|(_, hash)| state.blobs.get(hash).cloned()))
    }

    /// All file paths at head, sorted.
    pub fn paths_at_head(&self) -> StoreResult<Vec<String>> {
        let state = self.read_state()?;
        Ok(state.head_snapshot()?.keys().cloned().collect())
    }

    /// Number of commits ever created, reachable or not.
    pub fn commit_count(&self) -> StoreResult<usize> {
        Ok(self.read_state()?.commits.len())
    }

    pub fn commit_message(&self, commit: &ObjectHash) -> StoreResult<Option<String>> {
        Ok(self
            .read_state()?
            .commits
            .get(commit)
            .map(|c| c.message.clone()))
    }

    pub fn commit_parent(&self, commit: &ObjectHash) -> StoreResult<Option<ObjectHash>> {
        Ok(self
            .read_state()?
            .commits
            .get(commit)
            .and_then(|c| c.parent.clone()))
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))
    }

    /// Log the call and apply any injected failure.
    fn enter(&self, step: RemoteStep) -> StoreResult<()> {
        self.calls
            .lock()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))?
            .push(step);
        let failing = self
            .failures
            .read()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))?
            .contains(&step);
        if failing {
            return Err(StoreError::Remote {
                operation: step.to_string(),
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

fn collect_files<I, P, B>(files: I) -> Vec<(String, Bytes)>
where
    I: IntoIterator<Item = (P, B)>,
    P: Into<String>,
    B: AsRef<[u8]>,
{
    files
        .into_iter()
        .map(|(path, content)| (path.into(), Bytes::copy_from_slice(content.as_ref())))
        .collect()
}

fn unprocessable(operation: RemoteStep, body: String) -> StoreError {
    StoreError::Remote {
        operation: operation.to_string(),
        status: 422,
        body,
    }
}

fn validate_dir(path: &str) -> StoreResult<()> {
    if !path.is_empty() {
        validate_repo_path(path)?;
    }
    Ok(())
}

/// Immediate children of `dir` in `snapshot`. Sub-directories are
/// synthesized from deeper paths.
fn children(snapshot: &Snapshot, dir: &str) -> Vec<DirEntry> {
    let prefix = if dir.is_empty() {
        String::new()
    } else {
        format!("{dir}/")
    };
    let mut files = Vec::new();
    let mut dirs: BTreeMap<&str, blake3::Hasher> = BTreeMap::new();

    for (path, (_, hash)) in snapshot.range(prefix.clone()..) {
        let Some(rest) = path.strip_prefix(&prefix) else {
            break;
        };
        match rest.split_once('/') {
            Some((name, _)) => {
                dirs.entry(name)
                    .or_insert_with(|| {
                        let mut h = blake3::Hasher::new();
                        h.update(b"press-dir:");
                        h
                    })
                    .update(path.as_bytes())
                    .update(hash.as_str().as_bytes());
            }
            None => files.push(DirEntry {
                name: rest.to_string(),
                path: path.clone(),
                hash: hash.clone(),
                kind: EntryKind::File,
            }),
        }
    }

    files.extend(dirs.into_iter().map(|(name, hasher)| DirEntry {
        name: name.to_string(),
        path: format!("{prefix}{name}"),
        hash: ObjectHash::from_digest(hasher.finalize().as_bytes()),
        kind: EntryKind::Dir,
    }));
    files.sort_by(|a, b| a.name.cmp(&b.name));
    files
}

fn blob_hash(content: &[u8]) -> ObjectHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"press-blob:");
    hasher.update(content);
    ObjectHash::from_digest(hasher.finalize().as_bytes())
}

fn tree_hash(snapshot: &Snapshot) -> ObjectHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"press-tree:");
    for (path, (mode, hash)) in snapshot {
        hasher.update(mode.as_git_mode().as_bytes());
        hasher.update(b" ");
        hasher.update(path.as_bytes());
        hasher.update(b"\0");
        hasher.update(hash.as_str().as_bytes());
        hasher.update(b"\n");
    }
    ObjectHash::from_digest(hasher.finalize().as_bytes())
}

fn commit_hash(
    tree: &ObjectHash,
    parent: Option<&ObjectHash>,
    sequence: u64,
    message: &str,
) -> ObjectHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"press-commit:");
    hasher.update(tree.as_str().as_bytes());
    if let Some(parent) = parent {
        hasher.update(b"\nparent ");
        hasher.update(parent.as_str().as_bytes());
    }
    hasher.update(&sequence.to_le_bytes());
    hasher.update(message.as_bytes());
    ObjectHash::from_digest(hasher.finalize().as_bytes())
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    fn branch(&self) -> &str {
        &self.branch
    }

    async fn file_exists(&self, path: &str) -> StoreResult<Option<ObjectHash>> {
        Ok(self.read_file(path).await?.map(|file| file.hash))
    }

    async fn read_file(&self, path: &str) -> StoreResult<Option<RemoteFile>> {
        self.enter(RemoteStep::ReadContents)?;
        validate_repo_path(path)?;
        let state = self.read_state()?;
        let snapshot = state.head_snapshot()?;
        match snapshot.get(path) {
            Some((_, hash)) => {
                let content = state
                    .blobs
                    .get(hash)
                    .cloned()
                    .ok_or_else(|| StoreError::Internal(format!("blob {hash} is dangling")))?;
                Ok(Some(RemoteFile {
                    hash: hash.clone(),
                    content,
                }))
            }
            None if !children(snapshot, path).is_empty() => Err(StoreError::Decode(format!(
                "{path} is a directory, not a file"
            ))),
            None => Ok(None),
        }
    }

    async fn list_directory(&self, path: &str) -> StoreResult<Option<Vec<DirEntry>>> {
        self.enter(RemoteStep::ReadContents)?;
        validate_dir(path)?;
        let state = self.read_state()?;
        let snapshot = state.head_snapshot()?;
        if snapshot.contains_key(path) {
            return Err(StoreError::Decode(format!(
                "{path} is a file, not a directory"
            )));
        }
        let entries = children(snapshot, path);
        if entries.is_empty() && !path.is_empty() {
            Ok(None)
        } else {
            Ok(Some(entries))
        }
    }

    async fn branch_head(&self) -> StoreResult<ObjectHash> {
        self.enter(RemoteStep::BranchHead)?;
        self.head()
    }

    async fn commit_tree(&self, commit: &ObjectHash) -> StoreResult<ObjectHash> {
        self.enter(RemoteStep::CommitTree)?;
        let state = self.read_state()?;
        state
            .commits
            .get(commit)
            .map(|c| c.tree.clone())
            .ok_or_else(|| StoreError::Remote {
                operation: RemoteStep::CommitTree.to_string(),
                status: 404,
                body: format!("commit {commit} not found"),
            })
    }

    async fn create_blob(&self, content: &[u8]) -> StoreResult<ObjectHash> {
        self.enter(RemoteStep::CreateBlob)?;
        Ok(self.write_state()?.insert_blob(content))
    }

    async fn create_tree(
        &self,
        base_tree: &ObjectHash,
        entries: &[TreeEntry],
    ) -> StoreResult<ObjectHash> {
        self.enter(RemoteStep::CreateTree)?;
        let mut state = self.write_state()?;
        let mut snapshot = state.trees.get(base_tree).cloned().ok_or_else(|| {
            unprocessable(RemoteStep::CreateTree, format!("base tree {base_tree} not found"))
        })?;
        for entry in entries {
            validate_repo_path(&entry.path)?;
            match &entry.hash {
                Some(hash) => {
                    if !state.blobs.contains_key(hash) {
                        return Err(unprocessable(
                            RemoteStep::CreateTree,
                            format!("blob {hash} not found"),
                        ));
                    }
                    snapshot.insert(entry.path.clone(), (entry.mode, hash.clone()));
                }
                None => {
                    snapshot.remove(&entry.path);
                }
            }
        }
        Ok(state.insert_tree(snapshot))
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &ObjectHash,
        parent: &ObjectHash,
    ) -> StoreResult<ObjectHash> {
        self.enter(RemoteStep::CreateCommit)?;
        let mut state = self.write_state()?;
        if !state.trees.contains_key(tree) {
            return Err(unprocessable(
                RemoteStep::CreateCommit,
                format!("tree {tree} not found"),
            ));
        }
        if !state.commits.contains_key(parent) {
            return Err(unprocessable(
                RemoteStep::CreateCommit,
                format!("parent {parent} not found"),
            ));
        }
        Ok(state.insert_commit(message, tree.clone(), Some(parent.clone())))
    }

    async fn update_branch(&self, commit: &ObjectHash) -> StoreResult<()> {
        if let Some(barrier) = &self.ref_barrier {
            barrier.wait().await;
        }
        self.enter(RemoteStep::UpdateBranch)?;
        let mut state = self.write_state()?;
        if !state.commits.contains_key(commit) {
            return Err(unprocessable(
                RemoteStep::UpdateBranch,
                format!("commit {commit} not found"),
            ));
        }
        if !state.descends_from(commit, &state.head) {
            tracing::warn!(branch = %self.branch, commit = %commit.short(), "ref update rejected");
            return Err(StoreError::RefUpdateRejected {
                branch: self.branch.clone(),
                reason: "Update is not a fast forward".to_string(),
            });
        }
        state.head = commit.clone();
        tracing::info!(branch = %self.branch, commit = %commit.short(), "branch updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryContentStore {
        InMemoryContentStore::new("main").with_files([
            ("articles/hola.md", "hola"),
            ("public/images/hola/a.png", "A"),
            ("public/images/hola/b.png", "B"),
            ("public/images/hola/thumbs/a.png", "a"),
        ])
    }

    /// Run the full blob → tree → commit → ref sequence.
    async fn commit(
        store: &InMemoryContentStore,
        writes: &[(&str, &str)],
        deletes: &[&str],
    ) -> StoreResult<ObjectHash> {
        let head = store.branch_head().await?;
        let base = store.commit_tree(&head).await?;
        let mut entries = Vec::new();
        for (path, content) in writes {
            let hash = store.create_blob(content.as_bytes()).await?;
            entries.push(TreeEntry::upsert(*path, EntryMode::Regular, hash));
        }
        entries.extend(deletes.iter().map(|p| TreeEntry::delete(*p)));
        let tree = store.create_tree(&base, &entries).await?;
        let commit = store.create_commit("test", &tree, &head).await?;
        store.update_branch(&commit).await?;
        Ok(commit)
    }

    // ---- reads ----

    #[tokio::test]
    async fn absent_paths_are_none() {
        let store = InMemoryContentStore::new("main");
        assert!(store.file_exists("articles/x.md").await.unwrap().is_none());
        assert!(store.read_file("articles/x.md").await.unwrap().is_none());
        assert!(store.list_directory("articles").await.unwrap().is_none());
        assert_eq!(store.list_directory("").await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn read_seeded_content() {
        let store = seeded();
        let file = store.read_file("articles/hola.md").await.unwrap().unwrap();
        assert_eq!(file.text().unwrap(), "hola");
        assert_eq!(
            store.file_exists("articles/hola.md").await.unwrap(),
            Some(file.hash)
        );
    }

    #[tokio::test]
    async fn listing_shows_immediate_children() {
        let store = seeded();
        let entries = store
            .list_directory("public/images/hola")
            .await
            .unwrap()
            .unwrap();
        let names: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("a.png", EntryKind::File),
                ("b.png", EntryKind::File),
                ("thumbs", EntryKind::Dir),
            ]
        );
        assert_eq!(entries[0].path, "public/images/hola/a.png");
        assert!(store.list_directory("public/images/hol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn kind_mismatches_are_errors() {
        let store = seeded();
        assert!(store.list_directory("articles/hola.md").await.is_err());
        assert!(store.read_file("public/images/hola").await.is_err());
        assert!(store.read_file("/articles/hola.md").await.is_err());
    }

    // ---- commits ----

    #[tokio::test]
    async fn commit_layers_on_base_tree() {
        let store = seeded();
        let before = store.head().unwrap();
        let commit = commit(&store, &[("articles/new.md", "nuevo")], &["public/images/hola/b.png"])
            .await
            .unwrap();

        assert_eq!(store.head().unwrap(), commit);
        assert_eq!(store.commit_parent(&commit).unwrap(), Some(before));
        assert_eq!(store.commit_message(&commit).unwrap().as_deref(), Some("test"));
        assert_eq!(
            store.paths_at_head().unwrap(),
            vec![
                "articles/hola.md",
                "articles/new.md",
                "public/images/hola/a.png",
                "public/images/hola/thumbs/a.png",
            ]
        );
        assert_eq!(
            store.file_at_head("articles/new.md").unwrap().as_deref(),
            Some(&b"nuevo"[..])
        );
    }

    #[tokio::test]
    async fn identical_blobs_share_a_hash() {
        let store = InMemoryContentStore::new("main");
        let a = store.create_blob(b"same").await.unwrap();
        let b = store.create_blob(b"same").await.unwrap();
        let c = store.create_blob(b"other").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn non_fast_forward_is_rejected() {
        let store = seeded();
        let head = store.branch_head().await.unwrap();
        let base = store.commit_tree(&head).await.unwrap();
        let blob = store.create_blob(b"mine").await.unwrap();
        let tree = store
            .create_tree(&base, &[TreeEntry::upsert("articles/mine.md", EntryMode::Regular, blob)])
            .await
            .unwrap();
        let mine = store.create_commit("mine", &tree, &head).await.unwrap();

        let theirs = store
            .seed_commit("theirs", [("articles/theirs.md", "x")])
            .unwrap();

        let err = store.update_branch(&mine).await.unwrap_err();
        assert!(err.is_ref_conflict());
        assert_eq!(store.head().unwrap(), theirs);
        assert!(store.file_at_head("articles/mine.md").unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_objects_are_unprocessable() {
        let store = InMemoryContentStore::new("main");
        let bogus = ObjectHash::parse("deadbeef").unwrap();
        let err = store.create_tree(&bogus, &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Remote { status: 422, .. }));
        let err = store.update_branch(&bogus).await.unwrap_err();
        assert!(matches!(err, StoreError::Remote { status: 422, .. }));
    }

    // ---- fault injection ----

    #[tokio::test]
    async fn injected_failure_leaves_head_alone() {
        let store = seeded();
        let before = store.head().unwrap();
        store.fail_on(RemoteStep::CreateCommit);

        let err = commit(&store, &[("articles/x.md", "x")], &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Remote { status: 500, .. }));
        assert_eq!(store.head().unwrap(), before);
        assert_eq!(
            store.calls(),
            vec![
                RemoteStep::BranchHead,
                RemoteStep::CommitTree,
                RemoteStep::CreateBlob,
                RemoteStep::CreateTree,
                RemoteStep::CreateCommit,
            ]
        );

        store.clear_failures();
        commit(&store, &[("articles/x.md", "x")], &[]).await.unwrap();
        assert_ne!(store.head().unwrap(), before);
    }

    #[tokio::test]
    async fn barrier_lets_exactly_one_writer_win() {
        let barrier = Arc::new(Barrier::new(2));
        let store = seeded().with_ref_update_barrier(barrier);

        let (a, b) = tokio::join!(
            commit(&store, &[("articles/hola.md", "A")], &[]),
            commit(&store, &[("articles/hola.md", "B")], &[]),
        );
        let outcomes = [a.is_ok(), b.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        let loser = if a.is_err() { a } else { b };
        assert!(loser.unwrap_err().is_ref_conflict());
    }
}
