//! Article documents for press.
//!
//! An article is stored as `articles/<slug>.md`: a front-matter block with
//! `title`, `category` and `date` (`DD-MM-YYYY`), a blank line, and the
//! markdown body.
//!
//! # Key Types
//!
//! - [`FrontMatter`] -- the metadata block
//! - [`ArticleDocument`] -- slug + front matter + body
//! - [`ArticleSummary`] -- listing row with display fallbacks applied
//!
//! [`encode`] always produces a parseable block; [`decode`] never fails and
//! degrades missing or malformed fields to empty strings.

pub mod codec;
pub mod date;
pub mod document;
pub mod error;
pub mod slugify;
pub mod summary;

pub use codec::{decode, encode, Decoded};
pub use date::{format_date, parse_date, today, DATE_FORMAT};
pub use document::{ArticleDocument, FrontMatter};
pub use error::{ArticleError, ArticleResult};
pub use slugify::{derive_slug, slugify};
pub use summary::{sort_summaries, ArticleSummary, UNCATEGORIZED};
