use serde_json::Value;

use crate::error::ImageResult;
use crate::placeholder::ImagePlaceholder;

/// Ordered id → extension mapping for the images uploaded with one edit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageManifest {
    entries: Vec<ImagePlaceholder>,
}

impl ImageManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the editor's `imagesMeta` field (`[{id, alt?, ext}]`).
    ///
    /// Parsing never fails: malformed JSON yields an empty manifest,
    /// entries with a blank id or extension are dropped, values are
    /// trimmed, and a repeated id keeps its first entry. Character-set
    /// checks are left to [`validate`](Self::validate).
    pub fn parse_lenient(raw: &str) -> Self {
        let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) else {
            return Self::default();
        };
        let mut manifest = Self::default();
        for item in &items {
            let id = field(item, "id");
            let extension = field(item, "ext");
            if id.is_empty() || extension.is_empty() {
                continue;
            }
            let alt = Some(field(item, "alt")).filter(|a| !a.is_empty());
            manifest.insert(ImagePlaceholder { id, alt, extension });
        }
        manifest
    }

    /// Add an entry unless its id is already present. Returns `true` if added.
    pub fn insert(&mut self, placeholder: ImagePlaceholder) -> bool {
        if self.get(&placeholder.id).is_some() {
            return false;
        }
        self.entries.push(placeholder);
        true
    }

    pub fn get(&self, id: &str) -> Option<&ImagePlaceholder> {
        self.entries.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImagePlaceholder> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject ids or extensions that are unsafe as file names.
    pub fn validate(&self) -> ImageResult<()> {
        self.entries.iter().try_for_each(ImagePlaceholder::validate)
    }
}

impl FromIterator<ImagePlaceholder> for ImageManifest {
    fn from_iter<I: IntoIterator<Item = ImagePlaceholder>>(iter: I) -> Self {
        let mut manifest = Self::default();
        for placeholder in iter {
            manifest.insert(placeholder);
        }
        manifest
    }
}

/// Stringify a loosely typed JSON field; missing and null become "".
fn field(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_editor_metadata() {
        let m = ImageManifest::parse_lenient(
            r#"[{"id":" abc ","alt":"gato","ext":"png "},{"id":"def","ext":"jpg"}]"#,
        );
        assert_eq!(m.len(), 2);
        let abc = m.get("abc").unwrap();
        assert_eq!(abc.extension, "png");
        assert_eq!(abc.alt.as_deref(), Some("gato"));
        assert_eq!(m.get("def").unwrap().alt, None);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn malformed_json_is_empty() {
        assert!(ImageManifest::parse_lenient("not json").is_empty());
        assert!(ImageManifest::parse_lenient(r#"{"id":"a"}"#).is_empty());
        assert!(ImageManifest::parse_lenient("").is_empty());
        assert!(ImageManifest::parse_lenient("null").is_empty());
    }

    #[test]
    fn blank_entries_are_dropped() {
        let m = ImageManifest::parse_lenient(
            r#"[{"id":"","ext":"png"},{"id":"a"},{"ext":"gif"},{"id":"b","ext":"  "},7,{"id":"ok","ext":"gif"}]"#,
        );
        let ids: Vec<_> = m.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn numeric_ids_are_stringified_and_duplicates_keep_first() {
        let m = ImageManifest::parse_lenient(
            r#"[{"id":42,"ext":"png"},{"id":"42","ext":"gif"}]"#,
        );
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("42").unwrap().extension, "png");
    }

    #[test]
    fn unsafe_entries_fail_validation() {
        let m = ImageManifest::parse_lenient(r#"[{"id":"../../etc","ext":"png"}]"#);
        assert_eq!(m.len(), 1);
        assert!(m.validate().is_err());
    }
}
