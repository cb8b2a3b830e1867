use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use press_article::{
    decode, derive_slug, encode, sort_summaries, today, ArticleDocument, ArticleSummary,
    FrontMatter,
};
use press_commit::{ChangeSet, CommitBuilder};
use press_images::{
    diff_for_commit, extract_referenced_filenames, resolve_placeholders, ImageDiff, ImageError,
    PendingEdit,
};
use press_store::{ContentStore, RemoteFile};
use press_types::{
    article_path, image_dir, image_path, slug_from_article_file, ArticleSlug, ARTICLES_DIR,
};
use tracing::{debug, info};

use crate::error::{ConflictKind, PublishError, PublishResult};
use crate::input::{ArticleInput, PublishReceipt};

/// Article reads `list` keeps in flight at once.
const MAX_CONCURRENT_READS: usize = 8;

/// Article operations against one content store.
///
/// Holds no repository state: each call reads what it needs from the
/// branch, builds one change set and commits it.
#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn ContentStore>,
}

impl Publisher {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    /// Publish a new article. Fails with [`ConflictKind::AlreadyExists`] if
    /// the derived slug is taken.
    pub async fn create(
        &self,
        input: ArticleInput,
        edit: &PendingEdit,
    ) -> PublishResult<PublishReceipt> {
        let input = input.validated()?;
        edit.manifest().validate()?;
        let slug = derive_slug(&input.title)?;
        let path = article_path(&slug);

        if self.store.file_exists(&path).await?.is_some() {
            return Err(PublishError::conflict(&slug, ConflictKind::AlreadyExists));
        }

        let front_matter = FrontMatter {
            title: input.title,
            category: input.category,
            date: today(),
        };
        let body = resolve_placeholders(&input.body, &slug, edit.manifest());
        let referenced = extract_referenced_filenames(&body, &slug)?;
        require_payloads(edit, &referenced, &[])?;
        let diff = diff_for_commit(&edit.uploads(), &referenced, []);

        let changes = article_changes(
            format!("Add article: {slug}"),
            &slug,
            &path,
            encode(&front_matter, &body),
            &diff,
        );
        self.commit(&slug, path, &changes).await
    }

    /// Load an article. A missing file is `Ok(None)`.
    pub async fn read(&self, slug: &str) -> PublishResult<Option<ArticleDocument>> {
        let slug = parse_slug(slug)?;
        let Some(file) = self.store.read_file(&article_path(&slug)).await? else {
            return Ok(None);
        };
        let decoded = decode(&file_text(&file));
        let front_matter = decoded.front_matter;
        let title = match front_matter.title.trim() {
            "" => slug.to_string(),
            title => title.to_string(),
        };
        let front_matter = FrontMatter {
            title,
            category: front_matter.category.trim().to_string(),
            date: front_matter.date.trim().to_string(),
        };
        Ok(Some(ArticleDocument::new(slug, front_matter, decoded.body)))
    }

    /// Rewrite an existing article, keeping its slug and original date.
    ///
    /// Images are reconciled against the current contents of the article's
    /// image directory: referenced uploads are added, stored files the new
    /// body no longer points at are deleted.
    pub async fn update(
        &self,
        slug: &str,
        input: ArticleInput,
        edit: &PendingEdit,
    ) -> PublishResult<PublishReceipt> {
        let slug = parse_slug(slug)?;
        let input = input.validated()?;
        edit.manifest().validate()?;
        let path = article_path(&slug);

        let existing = self
            .store
            .read_file(&path)
            .await?
            .ok_or_else(|| PublishError::not_found(&slug))?;
        let date = match decode(&file_text(&existing)).front_matter.date.trim() {
            "" => today(),
            kept => kept.to_string(),
        };

        let front_matter = FrontMatter {
            title: input.title,
            category: input.category,
            date,
        };
        let body = resolve_placeholders(&input.body, &slug, edit.manifest());
        let referenced = extract_referenced_filenames(&body, &slug)?;
        let stored = self.stored_images(&slug).await?;
        require_payloads(edit, &referenced, &stored)?;
        let diff = diff_for_commit(
            &edit.uploads(),
            &referenced,
            stored.iter().map(String::as_str),
        );
        debug!(
            %slug,
            stored = stored.len(),
            added = diff.to_add.len(),
            orphaned = diff.to_delete.len(),
            "images reconciled"
        );

        let changes = article_changes(
            format!("Update article: {slug}"),
            &slug,
            &path,
            encode(&front_matter, &body),
            &diff,
        );
        self.commit(&slug, path, &changes).await
    }

    /// Remove an article together with every file in its image directory.
    pub async fn delete(&self, slug: &str) -> PublishResult<PublishReceipt> {
        let slug = parse_slug(slug)?;
        let path = article_path(&slug);
        if self.store.file_exists(&path).await?.is_none() {
            return Err(PublishError::not_found(&slug));
        }

        let mut changes = ChangeSet::new(format!("Delete article: {slug}")).delete(path.clone());
        for name in self.stored_images(&slug).await? {
            changes = changes.delete(image_path(&slug, &name));
        }
        self.commit(&slug, path, &changes).await
    }

    /// Every article under `articles/`, sorted for display.
    pub async fn list(&self) -> PublishResult<Vec<ArticleSummary>> {
        let Some(entries) = self.store.list_directory(ARTICLES_DIR).await? else {
            return Ok(Vec::new());
        };

        let articles: Vec<(String, String)> = entries
            .into_iter()
            .filter(|entry| entry.kind.is_file())
            .filter_map(|entry| {
                slug_from_article_file(&entry.name).map(|slug| (slug.to_string(), entry.path))
            })
            .collect();

        let store = self.store.as_ref();
        let loaded: Vec<Option<ArticleSummary>> = stream::iter(articles)
            .map(|(slug, path)| async move {
                let file = store.read_file(&path).await?;
                Ok::<_, PublishError>(file.map(|file| {
                    ArticleSummary::from_front_matter(slug, decode(&file_text(&file)).front_matter)
                }))
            })
            .buffered(MAX_CONCURRENT_READS)
            .try_collect()
            .await?;

        // Files deleted between the listing and the read are skipped.
        let mut summaries: Vec<ArticleSummary> = loaded.into_iter().flatten().collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    async fn stored_images(&self, slug: &ArticleSlug) -> PublishResult<Vec<String>> {
        let listing = self
            .store
            .list_directory(&image_dir(slug))
            .await?
            .unwrap_or_default();
        Ok(listing
            .into_iter()
            .filter(|entry| entry.kind.is_file())
            .map(|entry| entry.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }

    async fn commit(
        &self,
        slug: &ArticleSlug,
        path: String,
        changes: &ChangeSet,
    ) -> PublishResult<PublishReceipt> {
        let outcome = CommitBuilder::new(self.store.as_ref())
            .commit(changes)
            .await
            .map_err(|err| PublishError::from_commit(err, slug))?;
        info!(
            %slug,
            commit = %outcome.commit.short(),
            message = changes.message(),
            "article committed"
        );
        Ok(PublishReceipt {
            slug: slug.clone(),
            path,
            commit: outcome.commit,
            files_written: outcome.files_written.len(),
            files_deleted: outcome.files_deleted.len(),
        })
    }
}

fn parse_slug(raw: &str) -> PublishResult<ArticleSlug> {
    ArticleSlug::parse(raw.trim()).map_err(|err| PublishError::MalformedInput(err.to_string()))
}

fn file_text(file: &RemoteFile) -> String {
    String::from_utf8_lossy(&file.content).into_owned()
}

/// Every manifest image the body points at must either come with bytes or
/// already be stored.
fn require_payloads(
    edit: &PendingEdit,
    referenced: &BTreeSet<String>,
    stored: &[String],
) -> PublishResult<()> {
    let missing = edit.manifest().iter().find(|placeholder| {
        let filename = placeholder.filename();
        referenced.contains(&filename)
            && !edit.has_payload(&placeholder.id)
            && !stored.contains(&filename)
    });
    match missing {
        Some(placeholder) => Err(ImageError::MissingPayload {
            id: placeholder.id.clone(),
        }
        .into()),
        None => Ok(()),
    }
}

fn article_changes(
    message: String,
    slug: &ArticleSlug,
    path: &str,
    text: String,
    diff: &ImageDiff,
) -> ChangeSet {
    let mut changes = ChangeSet::new(message).write(path, text);
    for image in &diff.to_add {
        changes = changes.write(image_path(slug, &image.filename()), image.bytes.clone());
    }
    for name in &diff.to_delete {
        changes = changes.delete(image_path(slug, name));
    }
    changes
}
