use press_types::ArticleSlug;

use crate::error::{ArticleError, ArticleResult};

/// Turn a title into a slug candidate.
///
/// Diacritics are transliterated, apostrophes vanish so contractions stay
/// one word, every other run of non-alphanumerics becomes a single hyphen.
/// The result may be empty for titles with no usable characters.
pub fn slugify(title: &str) -> String {
    let without_apostrophes: String = title
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .collect();
    slug::slugify(without_apostrophes.trim())
}

/// Derive the slug an article with `title` is stored under.
pub fn derive_slug(title: &str) -> ArticleResult<ArticleSlug> {
    ArticleSlug::parse(slugify(title)).map_err(|_| ArticleError::UnderivableSlug {
        title: title.to_string(),
    })
}
