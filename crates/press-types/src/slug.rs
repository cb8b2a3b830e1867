use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// URL and file-name safe identifier of an article.
///
/// A slug is one or more runs of `[a-z0-9]` separated by single hyphens. It
/// doubles as the article's file name and as the name of its image
/// directory, so anything outside that alphabet is rejected up front.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArticleSlug(String);

impl ArticleSlug {
    /// Validate an already-derived slug.
    pub fn parse(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if is_valid_slug(&value) {
            Ok(Self(value))
        } else {
            Err(TypeError::InvalidSlug { value })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// `true` if `value` matches `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.split('-').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

impl fmt::Debug for ArticleSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArticleSlug({})", self.0)
    }
}

impl fmt::Display for ArticleSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ArticleSlug {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ArticleSlug {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ArticleSlug> for String {
    fn from(slug: ArticleSlug) -> Self {
        slug.0
    }
}

impl AsRef<str> for ArticleSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
