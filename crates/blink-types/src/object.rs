use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Length of the hex stem of every object id.
const STEM_LEN: usize = 32;

/// Maximum length of the extension suffix.
pub const MAX_EXTENSION_LEN: usize = 8;

/// Opaque identifier of a stored object, doubling as its storage key.
///
/// An `ObjectId` is a UUIDv7 in simple (32 hex character) form, optionally
/// followed by `.` and a short lowercase extension, e.g.
/// `0190f5a3c2e47b8d9a0b1c2d3e4f5a6b.png`. UUIDv7 combines a millisecond
/// timestamp with 74 random bits, so no two calls to [`ObjectId::generate`]
/// produce the same id, even concurrently.
///
/// The character set is restricted to `[0-9a-z.]` with a single dot, which
/// makes a parsed id safe to join onto a storage directory.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh id carrying the given extension.
    ///
    /// The extension is lower-cased; anything that is not 1–8 ASCII
    /// alphanumerics is dropped and the id is generated without one.
    pub fn generate(extension: Option<&str>) -> Self {
        let stem = Uuid::now_v7().simple().to_string();
        match extension.map(str::to_ascii_lowercase) {
            Some(ext) if is_valid_extension(&ext) => Self(format!("{stem}.{ext}")),
            _ => Self(stem),
        }
    }

    /// Parse an untrusted string (e.g. a URL path segment).
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let (stem, ext) = match s.split_once('.') {
            Some((stem, ext)) => (stem, Some(ext)),
            None => (s, None),
        };
        let stem_ok = stem.len() == STEM_LEN
            && stem.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        let ext_ok = ext.map_or(true, is_valid_extension);
        if stem_ok && ext_ok {
            Ok(Self(s.to_string()))
        } else {
            Err(TypeError::InvalidObjectId(s.to_string()))
        }
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The extension suffix, if any.
    pub fn extension(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, ext)| ext)
    }
}

/// Returns `true` if `ext` is an acceptable lowercase extension.
pub fn is_valid_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_parse_back() {
        let id = ObjectId::generate(Some("png"));
        assert_eq!(ObjectId::parse(id.as_str()).unwrap(), id);
        assert_eq!(id.extension(), Some("png"));
    }

    #[test]
    fn extension_is_lowercased() {
        let id = ObjectId::generate(Some("JPG"));
        assert_eq!(id.extension(), Some("jpg"));
    }

    #[test]
    fn bad_extension_is_dropped() {
        let id = ObjectId::generate(Some("../../etc"));
        assert_eq!(id.extension(), None);
        assert_eq!(id.as_str().len(), 32);

        let id = ObjectId::generate(Some("waytoolongext"));
        assert_eq!(id.extension(), None);
    }

    #[test]
    fn generate_is_unique() {
        let ids: HashSet<ObjectId> = (0..10_000).map(|_| ObjectId::generate(Some("png"))).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn parse_rejects_traversal_and_junk() {
        for bad in [
            "",
            "..",
            "../secret",
            "0190f5a3c2e47b8d9a0b1c2d3e4f5a6b/x",
            "0190F5A3C2E47B8D9A0B1C2D3E4F5A6B",
            "0190f5a3c2e47b8d9a0b1c2d3e4f5a6b.",
            "0190f5a3c2e47b8d9a0b1c2d3e4f5a6b.png.exe",
            "short.png",
        ] {
            assert!(ObjectId::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn parse_accepts_without_extension() {
        let id = ObjectId::parse("0190f5a3c2e47b8d9a0b1c2d3e4f5a6b").unwrap();
        assert_eq!(id.extension(), None);
    }

    #[test]
    fn serde_rejects_invalid() {
        let parsed: Result<ObjectId, _> = serde_json::from_str("\"../x\"");
        assert!(parsed.is_err());

        let id = ObjectId::generate(Some("gif"));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
