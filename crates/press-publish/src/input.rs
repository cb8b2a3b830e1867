use press_article::ArticleError;
use press_types::{ArticleSlug, ObjectHash};
use serde::{Deserialize, Serialize};

/// What an editor submits for a create or an update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInput {
    pub title: String,
    pub category: String,
    /// Markdown, possibly containing `__image:<id>__` placeholders.
    #[serde(alias = "content")]
    pub body: String,
}

impl ArticleInput {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            body: body.into(),
        }
    }

    /// Trim title and category and require all three fields. The body is
    /// kept as written.
    pub fn validated(self) -> Result<Self, ArticleError> {
        let title = self.title.trim().to_string();
        let category = self.category.trim().to_string();
        if title.is_empty() {
            return Err(ArticleError::MissingField("title"));
        }
        if category.is_empty() {
            return Err(ArticleError::MissingField("category"));
        }
        if self.body.trim().is_empty() {
            return Err(ArticleError::MissingField("body"));
        }
        Ok(Self {
            title,
            category,
            body: self.body,
        })
    }
}

/// Result of a successful create, update or delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    pub slug: ArticleSlug,
    /// `articles/<slug>.md`
    pub path: String,
    /// The commit the branch now points at.
    pub commit: ObjectHash,
    pub files_written: usize,
    pub files_deleted: usize,
}
