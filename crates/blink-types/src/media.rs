use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A declared mime type, normalized to lowercase `type/subtype`.
///
/// Parameters (`; charset=...`) are stripped. The value is whatever the
/// client declared; no content sniffing is performed.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaType {
    essence: String,
    slash: usize,
}

impl MediaType {
    /// Parse a declared mime type such as `image/PNG; q=1`.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let essence = s
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let slash = essence
            .find('/')
            .ok_or_else(|| TypeError::InvalidMediaType(s.to_string()))?;
        let (top, sub) = (&essence[..slash], &essence[slash + 1..]);
        if top.is_empty() || sub.is_empty() || sub.contains('/') || essence.contains(' ') {
            return Err(TypeError::InvalidMediaType(s.to_string()));
        }
        Ok(Self { essence, slash })
    }

    /// Fallback for content served without a known type.
    pub fn octet_stream() -> Self {
        Self {
            essence: "application/octet-stream".into(),
            slash: "application".len(),
        }
    }

    /// The normalized `type/subtype` string.
    pub fn as_str(&self) -> &str {
        &self.essence
    }

    /// Top-level type, e.g. `image`.
    pub fn top_level(&self) -> &str {
        &self.essence[..self.slash]
    }

    /// Subtype, e.g. `png`.
    pub fn subtype(&self) -> &str {
        &self.essence[self.slash + 1..]
    }

    /// Returns `true` for any member of the `image/*` family.
    pub fn is_image(&self) -> bool {
        self.top_level() == "image"
    }

    /// Storage extension for this type when the upload carries none.
    pub fn preferred_extension(&self) -> &'static str {
        if !self.is_image() {
            return "bin";
        }
        match self.subtype() {
            "png" => "png",
            "jpeg" | "jpg" | "pjpeg" => "jpg",
            "gif" => "gif",
            "webp" => "webp",
            "svg+xml" => "svg",
            "bmp" | "x-ms-bmp" => "bmp",
            "tiff" => "tif",
            "avif" => "avif",
            "x-icon" | "vnd.microsoft.icon" => "ico",
            "heic" => "heic",
            _ => "bin",
        }
    }
}

impl fmt::Debug for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaType({})", self.essence)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)
    }
}

impl TryFrom<String> for MediaType {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MediaType> for String {
    fn from(media: MediaType) -> Self {
        media.essence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes() {
        let m = MediaType::parse(" Image/PNG ; charset=binary").unwrap();
        assert_eq!(m.as_str(), "image/png");
        assert_eq!(m.top_level(), "image");
        assert_eq!(m.subtype(), "png");
        assert!(m.is_image());
    }

    #[test]
    fn non_images() {
        for s in ["text/plain", "application/pdf", "video/mp4", "imagex/png"] {
            assert!(!MediaType::parse(s).unwrap().is_image(), "{s}");
        }
    }

    #[test]
    fn parse_rejects_malformed() {
        for s in ["", "image", "image/", "/png", "image/png/x", "ima ge/png"] {
            assert!(MediaType::parse(s).is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn extensions() {
        let ext = |s: &str| MediaType::parse(s).unwrap().preferred_extension();
        assert_eq!(ext("image/jpeg"), "jpg");
        assert_eq!(ext("image/svg+xml"), "svg");
        assert_eq!(ext("image/x-unknown"), "bin");
        assert_eq!(ext("text/plain"), "bin");
    }

    #[test]
    fn octet_stream_parts() {
        let m = MediaType::octet_stream();
        assert_eq!(m.top_level(), "application");
        assert_eq!(m.subtype(), "octet-stream");
    }
}
