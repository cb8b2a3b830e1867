use std::collections::HashMap;

use bytes::Bytes;

use crate::manifest::ImageManifest;
use crate::placeholder::ImagePlaceholder;

/// An uploaded image with its metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingImage {
    pub placeholder: ImagePlaceholder,
    pub bytes: Bytes,
}

impl PendingImage {
    pub fn filename(&self) -> String {
        self.placeholder.filename()
    }
}

/// Images uploaded alongside one create/update request.
///
/// Lives only for the duration of that request; nothing here is stored
/// until the commit that includes it succeeds.
#[derive(Clone, Debug, Default)]
pub struct PendingEdit {
    manifest: ImageManifest,
    payloads: HashMap<String, Bytes>,
}

impl PendingEdit {
    pub fn new(manifest: ImageManifest) -> Self {
        Self {
            manifest,
            payloads: HashMap::new(),
        }
    }

    /// An edit that uploads no images.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach the bytes uploaded for `id`. Later uploads replace earlier ones.
    pub fn attach(&mut self, id: impl Into<String>, bytes: impl Into<Bytes>) {
        self.payloads.insert(id.into(), bytes.into());
    }

    pub fn with_image(mut self, placeholder: ImagePlaceholder, bytes: impl Into<Bytes>) -> Self {
        self.attach(placeholder.id.clone(), bytes);
        self.manifest.insert(placeholder);
        self
    }

    pub fn manifest(&self) -> &ImageManifest {
        &self.manifest
    }

    pub fn has_payload(&self, id: &str) -> bool {
        self.payloads.contains_key(id)
    }

    /// Manifest entries that arrived with bytes, in manifest order.
    /// Payloads with no manifest entry are ignored.
    pub fn uploads(&self) -> Vec<PendingImage> {
        self.manifest
            .iter()
            .filter_map(|placeholder| {
                self.payloads.get(&placeholder.id).map(|bytes| PendingImage {
                    placeholder: placeholder.clone(),
                    bytes: bytes.clone(),
                })
            })
            .collect()
    }
}
