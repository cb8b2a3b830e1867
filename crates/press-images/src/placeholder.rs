use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ImageError, ImageResult};

pub(crate) const TOKEN_PREFIX: &str = "__image:";
pub(crate) const TOKEN_SUFFIX: &str = "__";

/// Extension used when the media type is unknown.
pub const FALLBACK_EXTENSION: &str = "bin";

/// An image awaiting publication, as described by the editor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePlaceholder {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(rename = "ext")]
    pub extension: String,
}

impl ImagePlaceholder {
    pub fn new(id: impl Into<String>, extension: impl Into<String>) -> ImageResult<Self> {
        let placeholder = Self {
            id: id.into(),
            alt: None,
            extension: extension.into(),
        };
        placeholder.validate()?;
        Ok(placeholder)
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// `<id>.<ext>`, the name the image is stored under.
    pub fn filename(&self) -> String {
        format!("{}.{}", self.id, self.extension)
    }

    /// `__image:<id>__`
    pub fn token(&self) -> String {
        placeholder_token(&self.id)
    }

    /// Ids and extensions become file names, so both are restricted.
    pub fn validate(&self) -> ImageResult<()> {
        validate_image_id(&self.id)?;
        validate_extension(&self.id, &self.extension)
    }
}

/// `__image:<id>__`
pub fn placeholder_token(id: &str) -> String {
    format!("{TOKEN_PREFIX}{id}{TOKEN_SUFFIX}")
}

/// Ids are `[A-Za-z0-9-]+`. `_` is excluded so an id can never run into
/// the token suffix.
pub fn validate_image_id(id: &str) -> ImageResult<()> {
    if !id.is_empty() && id.bytes().all(is_id_byte) {
        Ok(())
    } else {
        Err(ImageError::InvalidId { id: id.to_string() })
    }
}

pub(crate) fn is_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// Extensions are `[A-Za-z0-9]+`.
pub fn validate_extension(id: &str, extension: &str) -> ImageResult<()> {
    if !extension.is_empty() && extension.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ImageError::InvalidExtension {
            id: id.to_string(),
            extension: extension.to_string(),
        })
    }
}

/// A fresh, time-ordered image id.
pub fn new_image_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// File extension for an image media type; unknown types get
/// [`FALLBACK_EXTENSION`].
pub fn extension_for_mime(mime: &str) -> &'static str {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => FALLBACK_EXTENSION,
    }
}

/// File extension for an image on disk, normalized the same way as
/// [`extension_for_mime`].
pub fn extension_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "png",
        Some("jpg" | "jpeg") => "jpg",
        Some("webp") => "webp",
        Some("gif") => "gif",
        _ => FALLBACK_EXTENSION,
    }
}
