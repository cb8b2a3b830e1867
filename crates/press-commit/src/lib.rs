//! Atomic multi-file commits for press.
//!
//! A [`ChangeSet`] collects file writes and deletions; [`CommitBuilder`]
//! turns it into exactly one commit on the store's branch, or nothing.
//!
//! # Sequence
//!
//! 1. Read the branch head.
//! 2. Read the head commit's tree (the base snapshot).
//! 3. Create one blob per written file, concurrently.
//! 4. Create a tree from the base plus a sparse delta (deletions carry no hash).
//! 5. Create a commit with the head as its only parent.
//! 6. Move the branch, never forced.
//!
//! Step 6 is the only step readers can observe. A failure anywhere before
//! it leaves the branch exactly where it was; a rejection at step 6 means
//! another writer moved the branch first, and the caller must start over.

pub mod builder;
pub mod change;
pub mod error;

pub use builder::{CommitBuilder, CommitOutcome};
pub use change::{ChangeSet, DeletionMarker, FileChange};
pub use error::{CommitError, CommitResult, CommitStage};
pub use press_store::TreeEntry;
