//! Repository path conventions and validation.
//!
//! Layout of the content repository:
//!
//! - `articles/<slug>.md` holds one article (front-matter + markdown body)
//! - `public/images/<slug>/<id>.<ext>` holds the images owned by that article
//!
//! Images are served from the site root, so the file stored at
//! `public/images/<slug>/<file>` is referenced in markdown as
//! `/images/<slug>/<file>`.
//!
//! Valid repository paths:
//! - Must be non-empty
//! - Must not start or end with `/`
//! - Must not contain `\` or NUL
//! - Components between slashes must be non-empty and not `.` or `..`

use crate::error::TypeError;
use crate::slug::ArticleSlug;

/// Directory holding every article document.
pub const ARTICLES_DIR: &str = "articles";

/// Directory holding one sub-directory of images per article.
pub const IMAGES_DIR: &str = "public/images";

/// URL prefix under which `IMAGES_DIR` is served.
pub const PUBLIC_IMAGES_PREFIX: &str = "/images";

/// Characters that are forbidden anywhere in a repository path.
const FORBIDDEN_CHARS: &[char] = &['\\', '\0'];

/// Validate a repository-relative path, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use press_types::validate_repo_path;
///
/// assert!(validate_repo_path("articles/hola.md").is_ok());
/// assert!(validate_repo_path("/articles/hola.md").is_err());
/// assert!(validate_repo_path("public/../secrets").is_err());
/// ```
pub fn validate_repo_path(path: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(invalid("path must not be empty"));
    }

    for ch in FORBIDDEN_CHARS {
        if path.contains(*ch) {
            return Err(TypeError::InvalidPath {
                path: path.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }
    }

    if path.starts_with('/') || path.ends_with('/') {
        return Err(invalid("must not start or end with '/'"));
    }

    for component in path.split('/') {
        match component {
            "" => return Err(invalid("path components must not be empty")),
            "." | ".." => return Err(invalid("path components must not be '.' or '..'")),
            _ => {}
        }
    }

    Ok(())
}

/// `articles/<slug>.md`
pub fn article_path(slug: &ArticleSlug) -> String {
    format!("{ARTICLES_DIR}/{slug}.md")
}

/// `public/images/<slug>`
pub fn image_dir(slug: &ArticleSlug) -> String {
    format!("{IMAGES_DIR}/{slug}")
}

/// `public/images/<slug>/<filename>`
pub fn image_path(slug: &ArticleSlug, filename: &str) -> String {
    format!("{IMAGES_DIR}/{slug}/{filename}")
}

/// `/images/<slug>/<filename>`, the URL markdown uses to reference an image.
pub fn public_image_url(slug: &ArticleSlug, filename: &str) -> String {
    format!("{PUBLIC_IMAGES_PREFIX}/{slug}/{filename}")
}

/// Recover the slug part of an article file name (`hola-mundo.md` →
/// `hola-mundo`). Returns `None` for anything that is not a `.md` file.
pub fn slug_from_article_file(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(3)?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (stem, ext) = name.split_at(split);
    if ext.eq_ignore_ascii_case(".md") && !stem.is_empty() {
        Some(stem)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(s: &str) -> ArticleSlug {
        ArticleSlug::parse(s).unwrap()
    }

    #[test]
    fn valid_paths() {
        assert!(validate_repo_path("articles/a.md").is_ok());
        assert!(validate_repo_path("public/images/a/b.png").is_ok());
        assert!(validate_repo_path("README").is_ok());
        assert!(validate_repo_path(".github/workflows/x.yml").is_ok());
    }

    #[test]
    fn reject_empty() {
        assert!(validate_repo_path("").is_err());
    }

    #[test]
    fn reject_slash_boundaries() {
        assert!(validate_repo_path("/leading").is_err());
        assert!(validate_repo_path("trailing/").is_err());
    }

    #[test]
    fn reject_empty_and_dot_components() {
        assert!(validate_repo_path("a//b").is_err());
        assert!(validate_repo_path("a/./b").is_err());
        assert!(validate_repo_path("a/../b").is_err());
        assert!(validate_repo_path("..").is_err());
    }

    #[test]
    fn reject_forbidden_chars() {
        assert!(validate_repo_path("a\\b").is_err());
        assert!(validate_repo_path("a\0b").is_err());
    }

    #[test]
    fn conventions() {
        let s = slug("ciclo-menstrual-101");
        assert_eq!(article_path(&s), "articles/ciclo-menstrual-101.md");
        assert_eq!(image_dir(&s), "public/images/ciclo-menstrual-101");
        assert_eq!(
            image_path(&s, "abc.png"),
            "public/images/ciclo-menstrual-101/abc.png"
        );
        assert_eq!(
            public_image_url(&s, "abc.png"),
            "/images/ciclo-menstrual-101/abc.png"
        );
    }

    #[test]
    fn convention_paths_are_valid() {
        let s = slug("a-b");
        assert!(validate_repo_path(&article_path(&s)).is_ok());
        assert!(validate_repo_path(&image_path(&s, "x.png")).is_ok());
    }

    #[test]
    fn article_file_names() {
        assert_eq!(slug_from_article_file("hola.md"), Some("hola"));
        assert_eq!(slug_from_article_file("HOLA.MD"), Some("HOLA"));
        assert_eq!(slug_from_article_file(".md"), None);
        assert_eq!(slug_from_article_file("notes.txt"), None);
        assert_eq!(slug_from_article_file("md"), None);
        assert_eq!(slug_from_article_file("ñ.md"), Some("ñ"));
    }
}
