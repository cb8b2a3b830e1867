//! `{{image:N}}` markers in body files.
//!
//! A body file refers to the N-th `--image` argument (1-based) with
//! `{{image:N}}`. Each image gets a fresh id and the marker is rewritten to
//! that image's placeholder token, so the publish path resolves it exactly
//! like an upload from the admin editor.

use std::path::PathBuf;

use anyhow::Context;
use press_images::{extension_for_path, new_image_id, ImagePlaceholder, PendingEdit};

const MARKER_PREFIX: &str = "{{image:";

pub fn marker(index: usize) -> String {
    format!("{MARKER_PREFIX}{index}}}}}")
}

#[derive(Debug, PartialEq, Eq)]
pub struct ExpandedBody {
    pub body: String,
    /// 1-based positions of images the body never mentions.
    pub unreferenced: Vec<usize>,
    /// Markers left in the body because no such image was given.
    pub unknown_markers: usize,
}

pub fn expand_markers(body: &str, placeholders: &[ImagePlaceholder]) -> ExpandedBody {
    let mut out = body.to_string();
    let mut unreferenced = Vec::new();
    for (position, placeholder) in (1..).zip(placeholders) {
        let marker = marker(position);
        if out.contains(&marker) {
            out = out.replace(&marker, &placeholder.token());
        } else {
            unreferenced.push(position);
        }
    }
    let unknown_markers = out.matches(MARKER_PREFIX).count();
    ExpandedBody {
        body: out,
        unreferenced,
        unknown_markers,
    }
}

/// Read every image and register it under a fresh id.
pub fn load_images(paths: &[PathBuf]) -> anyhow::Result<(Vec<ImagePlaceholder>, PendingEdit)> {
    let mut placeholders = Vec::with_capacity(paths.len());
    let mut edit = PendingEdit::empty();
    for path in paths {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
        let placeholder = ImagePlaceholder::new(new_image_id(), extension_for_path(path))?;
        edit = edit.with_image(placeholder.clone(), bytes);
        placeholders.push(placeholder);
    }
    Ok((placeholders, edit))
}
