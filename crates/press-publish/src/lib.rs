//! Article operations for press.
//!
//! [`Publisher`] ties the lower crates together: it validates input, derives
//! the slug, resolves image placeholders, encodes the document, reconciles
//! images against what is stored, and hands a single [`ChangeSet`] to the
//! commit builder. Every mutation is one commit, and every operation starts
//! from a fresh read of the branch.
//!
//! # Key Types
//!
//! - [`Publisher`] -- create / read / update / delete / list
//! - [`ArticleInput`] -- title, category and body supplied by an editor
//! - [`PublishReceipt`] -- slug, path and commit of a successful mutation
//! - [`PublishError`] -- the error taxonomy callers map onto user-facing statuses
//!
//! [`ChangeSet`]: press_commit::ChangeSet

pub mod error;
pub mod input;
pub mod publisher;

pub use error::{ConflictKind, PublishError, PublishResult};
pub use input::{ArticleInput, PublishReceipt};
pub use publisher::Publisher;
