use futures::future::try_join_all;
use press_store::{ContentStore, StoreError};
use press_types::ObjectHash;
use tracing::{debug, info, warn};

use crate::change::ChangeSet;
use crate::error::{CommitError, CommitResult, CommitStage};

/// What a successful commit produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitOutcome {
    /// The new branch head.
    pub commit: ObjectHash,
    /// The head the commit was layered on.
    pub parent: ObjectHash,
    pub tree: ObjectHash,
    pub files_written: Vec<String>,
    pub files_deleted: Vec<String>,
}

/// Builds one commit from a [`ChangeSet`] and publishes it by moving the
/// store's branch.
pub struct CommitBuilder<'a> {
    store: &'a dyn ContentStore,
}

fn failed_at(stage: CommitStage) -> impl FnOnce(StoreError) -> CommitError {
    move |source| CommitError::Store { stage, source }
}

impl<'a> CommitBuilder<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// Validate `changes`, then run the blob → tree → commit → ref sequence.
    pub async fn commit(&self, changes: &ChangeSet) -> CommitResult<CommitOutcome> {
        changes.validate()?;
        let branch = self.store.branch();

        let parent = self
            .store
            .branch_head()
            .await
            .map_err(failed_at(CommitStage::ResolveHead))?;
        let base_tree = self
            .store
            .commit_tree(&parent)
            .await
            .map_err(failed_at(CommitStage::ResolveBaseTree))?;
        debug!(branch, head = %parent.short(), base_tree = %base_tree.short(), "resolved base");

        let blobs = try_join_all(
            changes
                .writes()
                .iter()
                .map(|change| self.store.create_blob(&change.content)),
        )
        .await
        .map_err(failed_at(CommitStage::CreateBlobs))?;
        debug!(branch, blobs = blobs.len(), "blobs created");

        let entries = changes.tree_entries(blobs);
        let tree = self
            .store
            .create_tree(&base_tree, &entries)
            .await
            .map_err(failed_at(CommitStage::CreateTree))?;

        let commit = self
            .store
            .create_commit(changes.message(), &tree, &parent)
            .await
            .map_err(failed_at(CommitStage::CreateCommit))?;
        debug!(branch, tree = %tree.short(), commit = %commit.short(), "commit created");

        if let Err(err) = self.store.update_branch(&commit).await {
            if err.is_ref_conflict() {
                warn!(branch, head = %parent.short(), "branch moved during commit");
            }
            return Err(failed_at(CommitStage::UpdateRef)(err));
        }

        let outcome = CommitOutcome {
            commit,
            parent,
            tree,
            files_written: changes.writes().iter().map(|c| c.path.clone()).collect(),
            files_deleted: changes.deletions().iter().map(|d| d.path.clone()).collect(),
        };
        info!(
            branch,
            commit = %outcome.commit.short(),
            files = outcome.files_written.len(),
            deletions = outcome.files_deleted.len(),
            "commit published"
        );
        Ok(outcome)
    }
}
