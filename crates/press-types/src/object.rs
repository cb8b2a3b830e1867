use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of an object (blob, tree, or commit) in the remote store.
///
/// The remote store is content-addressed: the hash is derived from the
/// object's bytes and is handed back to us as a lowercase hex string. press
/// never computes these itself against the real store, so the hash is treated
/// as opaque beyond being well-formed hex.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectHash(String);

impl ObjectHash {
    /// Parse a hex object hash. Uppercase input is normalized to lowercase.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, TypeError> {
        let raw = value.as_ref().trim();
        if raw.is_empty() {
            return Err(TypeError::InvalidHash {
                value: raw.to_string(),
                reason: "hash must not be empty".into(),
            });
        }
        let lower = raw.to_ascii_lowercase();
        hex::decode(&lower).map_err(|e| TypeError::InvalidHash {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(lower))
    }

    /// Build a hash from raw digest bytes.
    pub fn from_digest(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// The full hex representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form (first 7 characters), as git prints it.
    pub fn short(&self) -> &str {
        &self.0[..7.min(self.0.len())]
    }
}

impl fmt::Debug for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHash({})", self.short())
    }
}

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ObjectHash {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ObjectHash> for String {
    fn from(hash: ObjectHash) -> Self {
        hash.0
    }
}

impl AsRef<str> for ObjectHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// EntryMode
// ---------------------------------------------------------------------------

/// File mode of a tree entry.
///
/// Only plain files are ever written by press; directories are implied by
/// paths and symlinks are never produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Normal file (100644).
    #[default]
    Regular,
    /// Executable file (100755).
    Executable,
}

impl EntryMode {
    /// The octal mode string the remote store expects.
    pub fn as_git_mode(&self) -> &'static str {
        match self {
            Self::Regular => "100644",
            Self::Executable => "100755",
        }
    }

    /// Parse from the octal mode string.
    pub fn from_git_mode(mode: &str) -> Result<Self, TypeError> {
        match mode {
            "100644" => Ok(Self::Regular),
            "100755" => Ok(Self::Executable),
            other => Err(TypeError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_git_mode())
    }
}

// ---------------------------------------------------------------------------
// EntryKind
// ---------------------------------------------------------------------------

/// Kind of an entry returned by a directory listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules, and anything else the store may report.
    Other,
}

impl EntryKind {
    /// Map the store's `type` string onto a kind.
    pub fn from_remote(kind: &str) -> Self {
        match kind {
            "file" => Self::File,
            "dir" => Self::Dir,
            _ => Self::Other,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_git_sha() {
        let h = ObjectHash::parse("3b18e512dba79e4c8300dd08aeb37f8e728b8dad").unwrap();
        assert_eq!(h.as_str(), "3b18e512dba79e4c8300dd08aeb37f8e728b8dad");
        assert_eq!(h.short(), "3b18e51");
    }

    #[test]
    fn parse_normalizes_case() {
        let h = ObjectHash::parse("ABCDEF01").unwrap();
        assert_eq!(h.as_str(), "abcdef01");
    }

    #[test]
    fn parse_rejects_empty_and_non_hex() {
        assert!(ObjectHash::parse("").is_err());
        assert!(ObjectHash::parse("   ").is_err());
        assert!(ObjectHash::parse("not-hex").is_err());
        assert!(ObjectHash::parse("abc").is_err()); // odd length
    }

    #[test]
    fn from_digest_is_hex() {
        let h = ObjectHash::from_digest(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(h.to_string(), "deadbeef");
    }

    #[test]
    fn serde_roundtrip_and_validation() {
        let h = ObjectHash::parse("deadbeef").unwrap();
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, "\"deadbeef\"");
        let back: ObjectHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);

        let bad: Result<ObjectHash, _> = serde_json::from_str("\"zz\"");
        assert!(bad.is_err());
    }

    #[test]
    fn entry_mode_strings() {
        assert_eq!(EntryMode::Regular.as_git_mode(), "100644");
        assert_eq!(EntryMode::Executable.to_string(), "100755");
        assert_eq!(EntryMode::from_git_mode("100755").unwrap(), EntryMode::Executable);
        assert!(EntryMode::from_git_mode("040000").is_err());
        assert_eq!(EntryMode::default(), EntryMode::Regular);
    }

    #[test]
    fn entry_kind_mapping() {
        assert_eq!(EntryKind::from_remote("file"), EntryKind::File);
        assert_eq!(EntryKind::from_remote("dir"), EntryKind::Dir);
        assert_eq!(EntryKind::from_remote("symlink"), EntryKind::Other);
        assert!(EntryKind::File.is_file());
        assert!(!EntryKind::Dir.is_file());
    }
}
