//! Foundation types for press.
//!
//! press publishes a markdown blog by committing files to a remote git
//! repository that acts as the content database. This crate holds the
//! identifiers and conventions every other press crate agrees on.
//!
//! # Key Types
//!
//! - [`ObjectHash`] -- Hex identifier of a blob, tree, or commit in the remote store
//! - [`EntryMode`] -- File mode of a tree entry (regular or executable)
//! - [`EntryKind`] -- Kind of a directory listing entry
//! - [`ArticleSlug`] -- Validated URL/file-name slug of an article
//!
//! The [`paths`] module fixes where articles and their images live inside the
//! repository and how images are addressed publicly.

pub mod error;
pub mod object;
pub mod paths;
pub mod slug;

pub use error::TypeError;
pub use object::{EntryKind, EntryMode, ObjectHash};
pub use paths::{
    article_path, image_dir, image_path, public_image_url, slug_from_article_file,
    validate_repo_path, ARTICLES_DIR, IMAGES_DIR, PUBLIC_IMAGES_PREFIX,
};
pub use slug::{is_valid_slug, ArticleSlug};
