use press_types::ArticleSlug;
use serde::{Deserialize, Serialize};

use crate::codec;

/// Metadata block at the top of an article file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub category: String,
    /// `DD-MM-YYYY`
    pub date: String,
}

/// A full article: where it lives plus what it says.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDocument {
    pub slug: ArticleSlug,
    pub title: String,
    pub category: String,
    pub date: String,
    pub body: String,
}

impl ArticleDocument {
    pub fn new(slug: ArticleSlug, front_matter: FrontMatter, body: impl Into<String>) -> Self {
        Self {
            slug,
            title: front_matter.title,
            category: front_matter.category,
            date: front_matter.date,
            body: body.into(),
        }
    }

    /// Decode a stored file. Never fails.
    pub fn from_text(slug: ArticleSlug, text: &str) -> Self {
        let decoded = codec::decode(text);
        Self::new(slug, decoded.front_matter, decoded.body)
    }

    pub fn front_matter(&self) -> FrontMatter {
        FrontMatter {
            title: self.title.clone(),
            category: self.category.clone(),
            date: self.date.clone(),
        }
    }

    /// The file contents to store.
    pub fn to_text(&self) -> String {
        codec::encode(&self.front_matter(), &self.body)
    }
}
