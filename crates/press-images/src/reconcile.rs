use std::collections::BTreeSet;

use press_types::{public_image_url, ArticleSlug, PUBLIC_IMAGES_PREFIX};
use regex::Regex;

use crate::error::ImageResult;
use crate::manifest::ImageManifest;
use crate::pending::PendingImage;
use crate::placeholder::{is_id_byte, TOKEN_PREFIX, TOKEN_SUFFIX};

/// What one commit must do to the article's image directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageDiff {
    /// Uploads the final body references, sorted by filename.
    pub to_add: Vec<PendingImage>,
    /// Stored filenames the final body no longer references, sorted.
    pub to_delete: Vec<String>,
}

impl ImageDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }
}

/// Replace every `__image:<id>__` token that has a manifest entry with
/// `/images/<slug>/<id>.<ext>`. Tokens without an entry are left as is.
///
/// The body is scanned once, left to right, so replaced text is never
/// rescanned and the manifest order does not matter.
pub fn resolve_placeholders(body: &str, slug: &ArticleSlug, manifest: &ImageManifest) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(start) = rest.find(TOKEN_PREFIX) {
        out.push_str(&rest[..start]);
        let after = &rest[start + TOKEN_PREFIX.len()..];
        let (id, tail) = after.split_at(after.bytes().take_while(|b| is_id_byte(*b)).count());
        match (tail.strip_prefix(TOKEN_SUFFIX), manifest.get(id)) {
            (Some(remaining), Some(placeholder)) if !id.is_empty() => {
                out.push_str(&public_image_url(slug, &placeholder.filename()));
                rest = remaining;
            }
            _ => {
                out.push_str(TOKEN_PREFIX);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Finds `/images/<slug>/<file>` references in markdown, whether written as
/// a root-relative path or inside an absolute URL.
#[derive(Clone, Debug)]
pub struct ReferenceScanner {
    pattern: Regex,
}

impl ReferenceScanner {
    pub fn new(slug: &ArticleSlug) -> ImageResult<Self> {
        let pattern = Regex::new(&format!(
            r#"{}/{}/([^\s)"'>]+)"#,
            regex::escape(PUBLIC_IMAGES_PREFIX),
            regex::escape(slug.as_str())
        ))?;
        Ok(Self { pattern })
    }

    /// Bare filenames referenced by `body`, query strings and fragments
    /// stripped.
    pub fn scan(&self, body: &str) -> BTreeSet<String> {
        self.pattern
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| {
                let raw = m.as_str().trim();
                let name = raw.split(['?', '#']).next().unwrap_or_default();
                (!name.is_empty()).then(|| name.to_string())
            })
            .collect()
    }
}

/// Filenames under the article's image directory that `body` references.
pub fn extract_referenced_filenames(
    body: &str,
    slug: &ArticleSlug,
) -> ImageResult<BTreeSet<String>> {
    Ok(ReferenceScanner::new(slug)?.scan(body))
}

/// Decide which uploads to store and which stored files to delete.
///
/// `existing` must be the current listing of the article's image
/// directory; pass nothing when the article is new.
pub fn diff_for_commit<'a>(
    uploads: &[PendingImage],
    referenced: &BTreeSet<String>,
    existing: impl IntoIterator<Item = &'a str>,
) -> ImageDiff {
    let mut to_add: Vec<PendingImage> = uploads
        .iter()
        .filter(|image| referenced.contains(&image.filename()))
        .cloned()
        .collect();
    to_add.sort_by_key(PendingImage::filename);
    to_add.dedup_by_key(|image| image.filename());

    let to_delete: BTreeSet<&str> = existing
        .into_iter()
        .filter(|name| !referenced.contains(*name))
        .collect();

    ImageDiff {
        to_add,
        to_delete: to_delete.into_iter().map(str::to_string).collect(),
    }
}
