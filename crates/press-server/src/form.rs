//! The multipart article form.
//!
//! Fields: `title`, `category`, `content`, `imagesMeta` (a JSON array of
//! `{id, alt?, ext}`), and one `image:<id>` file per uploaded image.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use bytes::Bytes;
use press_images::{ImageManifest, PendingEdit};
use press_publish::ArticleInput;

use crate::error::{ServerError, ServerResult};

const IMAGE_FIELD_PREFIX: &str = "image:";

fn bad_form(err: MultipartError) -> ServerError {
    ServerError::BadRequest(format!("Invalid form data: {err}"))
}

/// Read the whole form. Unknown fields are skipped; a missing or malformed
/// `imagesMeta` means no images.
pub async fn read_article_form(mut multipart: Multipart) -> ServerResult<(ArticleInput, PendingEdit)> {
    let mut input = ArticleInput::default();
    let mut images_meta: Option<String> = None;
    let mut uploads: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "title" => input.title = field.text().await.map_err(bad_form)?,
            "category" => input.category = field.text().await.map_err(bad_form)?,
            "content" => input.body = field.text().await.map_err(bad_form)?,
            "imagesMeta" => images_meta = Some(field.text().await.map_err(bad_form)?),
            other => {
                if let Some(id) = other.strip_prefix(IMAGE_FIELD_PREFIX) {
                    let id = id.trim().to_string();
                    uploads.push((id, field.bytes().await.map_err(bad_form)?));
                }
            }
        }
    }

    let manifest = ImageManifest::parse_lenient(images_meta.as_deref().unwrap_or("[]"));
    let mut edit = PendingEdit::new(manifest);
    for (id, bytes) in uploads {
        edit.attach(id, bytes);
    }
    Ok((input, edit))
}
