//! Image lifecycle for press articles.
//!
//! While an article is being edited, newly pasted images are referenced in
//! the markdown by placeholder tokens (`__image:<id>__`) and their bytes are
//! held in a [`PendingEdit`]. At publish time:
//!
//! 1. [`resolve_placeholders`] rewrites tokens to `/images/<slug>/<id>.<ext>`.
//! 2. [`extract_referenced_filenames`] reads back which image files the final
//!    body points at.
//! 3. [`diff_for_commit`] decides which uploads to store and which stored
//!    files are now orphans.
//!
//! All three are pure functions of their inputs.

pub mod error;
pub mod manifest;
pub mod pending;
pub mod placeholder;
pub mod reconcile;

pub use error::{ImageError, ImageResult};
pub use manifest::ImageManifest;
pub use pending::{PendingEdit, PendingImage};
pub use placeholder::{
    extension_for_mime, extension_for_path, new_image_id, placeholder_token, validate_extension,
    validate_image_id, ImagePlaceholder, FALLBACK_EXTENSION,
};
pub use reconcile::{
    diff_for_commit, extract_referenced_filenames, resolve_placeholders, ImageDiff,
    ReferenceScanner,
};
