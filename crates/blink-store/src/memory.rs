use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use blink_types::{MediaType, ObjectId, ObjectMeta};

use crate::error::{StoreError, StoreResult};
use crate::traits::{storage_extension, BlobStore, StoredBlob};

/// In-memory, `DashMap`-based blob store.
///
/// Intended for tests and embedding. Blobs are held as reference-counted
/// [`Bytes`], so reads are cheap clones. Operations on different ids lock
/// different shards and do not contend.
pub struct InMemoryBlobStore {
    blobs: DashMap<ObjectId, StoredBlob>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: DashMap::new(),
        }
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs.iter().map(|entry| entry.meta.size_bytes).sum()
    }

    /// Return a sorted list of all object ids in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.blobs.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn store(
        &self,
        data: Bytes,
        media_type: &MediaType,
        original_name: Option<&str>,
    ) -> StoreResult<ObjectMeta> {
        let extension = storage_extension(media_type, original_name);
        let id = ObjectId::generate(Some(&extension));
        let meta = ObjectMeta::new(id.clone(), data.len() as u64, media_type.clone());

        match self.blobs.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::AlreadyExists(id)),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(StoredBlob {
                    meta: meta.clone(),
                    data,
                });
                Ok(meta)
            }
        }
    }

    async fn retrieve(&self, id: &ObjectId) -> StoreResult<Option<StoredBlob>> {
        Ok(self.blobs.get(id).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.blobs.remove(id).is_some())
    }

    async fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.blobs.contains_key(id))
    }

    fn len(&self) -> usize {
        self.blobs.len()
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("object_count", &self.blobs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn png() -> MediaType {
        MediaType::parse("image/png").unwrap()
    }

    #[tokio::test]
    async fn store_and_retrieve() {
        let store = InMemoryBlobStore::new();
        let meta = store
            .store(Bytes::from_static(b"\x89PNG data"), &png(), Some("cat.png"))
            .await
            .unwrap();
        assert_eq!(meta.size_bytes, 9);
        assert_eq!(meta.object_id.extension(), Some("png"));

        let blob = store.retrieve(&meta.object_id).await.unwrap().expect("should exist");
        assert_eq!(blob.data.as_ref(), b"\x89PNG data");
        assert_eq!(blob.meta, meta);
    }

    #[tokio::test]
    async fn same_content_gets_distinct_ids() {
        let store = InMemoryBlobStore::new();
        let a = store.store(Bytes::from_static(b"same"), &png(), None).await.unwrap();
        let b = store.store(Bytes::from_static(b"same"), &png(), None).await.unwrap();
        assert_ne!(a.object_id, b.object_id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryBlobStore::new();
        let meta = store.store(Bytes::from_static(b"x"), &png(), None).await.unwrap();
        assert!(store.delete(&meta.object_id).await.unwrap());
        assert!(!store.exists(&meta.object_id).await.unwrap());
        assert!(!store.delete(&meta.object_id).await.unwrap());
    }

    #[tokio::test]
    async fn retrieve_missing_returns_none() {
        let store = InMemoryBlobStore::new();
        let id = ObjectId::generate(Some("png"));
        assert!(store.retrieve(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn total_bytes_and_ids() {
        let store = InMemoryBlobStore::new();
        store.store(Bytes::from_static(b"12345"), &png(), None).await.unwrap();
        store.store(Bytes::from_static(b"123456789"), &png(), None).await.unwrap();
        assert_eq!(store.total_bytes(), 14);

        let ids = store.all_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids[0] <= ids[1]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_stores_never_share_ids() {
        let store = Arc::new(InMemoryBlobStore::new());
        let handles: Vec<_> = (0..64)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .store(Bytes::from_static(b"img"), &png(), None)
                        .await
                        .unwrap()
                        .object_id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.expect("task should not panic"));
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 64);
        assert_eq!(store.len(), 64);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryBlobStore::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryBlobStore"));
        assert!(debug.contains("object_count"));
    }
}
