//! Content store client for press.
//!
//! The content repository lives on a remote git host and is the only source
//! of truth for articles and images. This crate wraps the two HTTP surfaces
//! press needs from it:
//!
//! - Contents reads (`file_exists`, `read_file`, `list_directory`) at the tip
//!   of the configured branch. A missing path is `Ok(None)`, never an error.
//! - Git data primitives (blob, tree, commit, ref update) used by the atomic
//!   commit builder in `press-commit`.
//!
//! # Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`GitHubStore`] -- `reqwest` client for the GitHub REST API
//! - [`InMemoryContentStore`] -- in-process model of blobs, trees, commits and
//!   a fast-forward-only branch ref, with fault injection for tests
//!
//! # Design Rules
//!
//! 1. The branch ref is never force-updated.
//! 2. Remote error bodies are preserved verbatim for operators.
//! 3. Credential scheme is resolved once, when [`RemoteConfig`] is built.

pub mod config;
pub mod error;
pub mod github;
pub mod memory;
pub mod traits;

pub use config::{normalize_branch, CredentialScheme, RemoteConfig, DEFAULT_BRANCH};
pub use error::{StoreError, StoreResult};
pub use github::{GitHubOptions, GitHubStore, DEFAULT_API_BASE};
pub use memory::{InMemoryContentStore, RemoteStep};
pub use traits::{ContentStore, DirEntry, RemoteFile, TreeEntry};
