use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::date::parse_date;
use crate::document::FrontMatter;

/// Category shown for articles that have none.
pub const UNCATEGORIZED: &str = "uncategorized";

/// One row of the article index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub category: String,
    pub date: String,
}

impl ArticleSummary {
    /// Build a row, falling back to the slug for a blank title and to
    /// [`UNCATEGORIZED`] for a blank category.
    pub fn from_front_matter(slug: impl Into<String>, front_matter: FrontMatter) -> Self {
        let slug = slug.into();
        let title = non_blank(front_matter.title).unwrap_or_else(|| slug.clone());
        let category = non_blank(front_matter.category).unwrap_or_else(|| UNCATEGORIZED.into());
        Self {
            slug,
            title,
            category,
            date: front_matter.date.trim().to_string(),
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Category ascending, newest first within a category (undated last),
/// then title ascending. Text comparisons ignore case.
pub fn sort_summaries(summaries: &mut [ArticleSummary]) {
    summaries.sort_by(|a, b| {
        text_order(&a.category, &b.category)
            .then_with(|| match (parse_date(&a.date), parse_date(&b.date)) {
                (Some(da), Some(db)) => db.cmp(&da),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| text_order(&a.title, &b.title))
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

fn text_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
