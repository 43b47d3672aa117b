use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use blink_types::object::is_valid_extension;
use blink_types::{MediaType, ObjectId, ObjectMeta};

use crate::error::StoreResult;

/// A blob read back from a store, with its metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    pub meta: ObjectMeta,
    pub data: Bytes,
}

/// Storage backend for uploaded blobs.
///
/// All implementations must satisfy these invariants:
/// - `store` generates the object id itself; no two calls ever return the
///   same id, even when invoked concurrently.
/// - A blob is only reported by `retrieve`/`exists` once its bytes are
///   completely written.
/// - `delete` is idempotent: deleting an absent id returns `Ok(false)`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` under a new unique id and return its metadata.
    ///
    /// `original_name` is the client's file name, used only to pick the
    /// extension of the stored object.
    async fn store(
        &self,
        data: Bytes,
        media_type: &MediaType,
        original_name: Option<&str>,
    ) -> StoreResult<ObjectMeta>;

    /// Read a blob by id.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    async fn retrieve(&self, id: &ObjectId) -> StoreResult<Option<StoredBlob>>;

    /// Delete a blob by id. Returns `true` if the object existed.
    async fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Check whether a blob exists.
    async fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Number of live blobs tracked by this store.
    fn len(&self) -> usize;

    /// Returns `true` if the store tracks no blobs.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pick the extension for a new object.
///
/// The extension of the client's file name wins if it is short and
/// alphanumeric; otherwise it is derived from the media type.
pub fn storage_extension(media_type: &MediaType, original_name: Option<&str>) -> String {
    original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| is_valid_extension(ext))
        .unwrap_or_else(|| media_type.preferred_extension().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> MediaType {
        MediaType::parse("image/png").unwrap()
    }

    #[test]
    fn extension_from_file_name() {
        assert_eq!(storage_extension(&png(), Some("holiday.JPEG")), "jpeg");
    }

    #[test]
    fn extension_falls_back_to_media_type() {
        assert_eq!(storage_extension(&png(), None), "png");
        assert_eq!(storage_extension(&png(), Some("noext")), "png");
        assert_eq!(storage_extension(&png(), Some("weird.ex-e")), "png");
        assert_eq!(storage_extension(&png(), Some("archive.superlongext")), "png");
    }
}
