use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use blink_expiry::{ExpiryError, ExpiryHandler, ExpiryResult};
use blink_registry::CodeRegistry;
use blink_store::{BlobStore, StoreResult};
use blink_types::{AccessCode, ObjectId};

/// Expiry handler deleting an object's blob and releasing its code.
///
/// The code is released even when the blob cannot be deleted: a leaked file
/// is harmless, a code that resolves to a dead link is not.
pub struct Reaper {
    store: Arc<dyn BlobStore>,
    registry: Arc<CodeRegistry>,
}

impl Reaper {
    pub fn new(store: Arc<dyn BlobStore>, registry: Arc<CodeRegistry>) -> Self {
        Self { store, registry }
    }

    /// Delete the blob, then release the code. Returns the delete outcome.
    pub(crate) async fn reap(&self, object_id: &ObjectId, code: AccessCode) -> StoreResult<bool> {
        let deleted = self.store.delete(object_id).await;
        self.registry.release_if(&code, object_id);
        if let Err(e) = &deleted {
            warn!(object_id = %object_id, %code, error = %e, "blob left orphaned on storage");
        }
        deleted
    }
}

#[async_trait]
impl ExpiryHandler for Reaper {
    async fn on_expire(&self, object_id: &ObjectId, code: AccessCode) -> ExpiryResult<()> {
        self.reap(object_id, code)
            .await
            .map(|_| ())
            .map_err(|e| ExpiryError::Handler(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blink_store::{InMemoryBlobStore, StoreError, StoredBlob};
    use blink_types::{MediaType, ObjectMeta};
    use bytes::Bytes;

    /// Store whose deletes always fail.
    struct StuckStore(InMemoryBlobStore);

    #[async_trait]
    impl BlobStore for StuckStore {
        async fn store(&self, data: Bytes, media_type: &MediaType, name: Option<&str>) -> StoreResult<ObjectMeta> {
            self.0.store(data, media_type, name).await
        }
        async fn retrieve(&self, id: &ObjectId) -> StoreResult<Option<StoredBlob>> {
            self.0.retrieve(id).await
        }
        async fn delete(&self, _id: &ObjectId) -> StoreResult<bool> {
            Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")))
        }
        async fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
            self.0.exists(id).await
        }
        fn len(&self) -> usize {
            self.0.len()
        }
    }

    async fn stored(store: &dyn BlobStore) -> ObjectId {
        let png = MediaType::parse("image/png").unwrap();
        store.store(Bytes::from_static(b"img"), &png, None).await.unwrap().object_id
    }

    #[tokio::test]
    async fn reap_deletes_blob_and_releases_code() {
        let store = Arc::new(InMemoryBlobStore::new());
        let registry = Arc::new(CodeRegistry::default());
        let id = stored(store.as_ref()).await;
        let code = registry.allocate(&id).unwrap();

        let reaper = Reaper::new(store.clone(), registry.clone());
        reaper.on_expire(&id, code).await.unwrap();

        assert!(store.is_empty());
        assert!(registry.resolve(&code).is_none());
    }

    #[tokio::test]
    async fn reap_of_missing_blob_is_ok() {
        let store = Arc::new(InMemoryBlobStore::new());
        let registry = Arc::new(CodeRegistry::default());
        let id = ObjectId::generate(Some("png"));
        let code = registry.allocate(&id).unwrap();

        let reaper = Reaper::new(store, registry.clone());
        assert!(!reaper.reap(&id, code).await.unwrap());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn failed_delete_still_releases_code() {
        let store = Arc::new(StuckStore(InMemoryBlobStore::new()));
        let registry = Arc::new(CodeRegistry::default());
        let id = stored(store.as_ref()).await;
        let code = registry.allocate(&id).unwrap();

        let reaper = Reaper::new(store.clone(), registry.clone());
        let err = reaper.on_expire(&id, code).await.unwrap_err();
        assert!(matches!(err, ExpiryError::Handler(_)));
        assert!(registry.resolve(&code).is_none());
        assert_eq!(store.len(), 1);
    }
}
