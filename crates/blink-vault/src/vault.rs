use std::sync::Arc;

use tracing::{debug, info, warn};

use blink_expiry::ExpiryScheduler;
use blink_registry::CodeRegistry;
use blink_store::{BlobStore, InMemoryBlobStore, StoredBlob};
use blink_types::{AccessCode, MediaType, ObjectId};

use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::handle::{DirectHandle, IngestReceipt, Upload};
use crate::reaper::Reaper;

/// Ephemeral object vault: ingest, lookup, and expiry in one place.
pub struct Vault {
    store: Arc<dyn BlobStore>,
    registry: Arc<CodeRegistry>,
    reaper: Arc<Reaper>,
    scheduler: ExpiryScheduler,
    config: VaultConfig,
}

impl Vault {
    /// Build a vault over `store`.
    pub fn new(store: Arc<dyn BlobStore>, config: VaultConfig) -> Self {
        let registry = Arc::new(CodeRegistry::new(config.code_capacity));
        let reaper = Arc::new(Reaper::new(Arc::clone(&store), Arc::clone(&registry)));
        let scheduler = ExpiryScheduler::new(reaper.clone());
        Self {
            store,
            registry,
            reaper,
            scheduler,
            config,
        }
    }

    /// A vault backed by an [`InMemoryBlobStore`].
    pub fn in_memory(config: VaultConfig) -> Self {
        Self::new(Arc::new(InMemoryBlobStore::new()), config)
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Number of objects reachable by code.
    pub fn live_objects(&self) -> usize {
        self.registry.len()
    }

    /// Number of expiry tasks still waiting to fire.
    pub fn pending_expiries(&self) -> usize {
        self.scheduler.pending()
    }

    /// Reject anything outside the `image/*` family.
    pub fn check_media_type(&self, mime_type: &str) -> VaultResult<MediaType> {
        match MediaType::parse(mime_type) {
            Ok(media) if media.is_image() => Ok(media),
            _ => Err(VaultError::UnsupportedMediaType(mime_type.to_string())),
        }
    }

    /// Reject sizes above the configured maximum.
    pub fn check_size(&self, size: u64) -> VaultResult<()> {
        if size > self.config.max_upload_bytes {
            return Err(VaultError::PayloadTooLarge {
                size,
                limit: self.config.max_upload_bytes,
            });
        }
        Ok(())
    }

    /// Accept an upload and issue its handles.
    ///
    /// Validation happens in order: media type, declared size, actual size.
    /// Once the blob is stored, any later failure deletes it again before the
    /// error is returned.
    pub async fn ingest(&self, upload: Upload) -> VaultResult<IngestReceipt> {
        let media_type = self.check_media_type(&upload.mime_type)?;
        self.check_size(upload.declared_size)?;
        self.check_size(upload.bytes.len() as u64)?;

        let meta = self
            .store
            .store(upload.bytes, &media_type, upload.file_name.as_deref())
            .await?;
        let object_id = meta.object_id;

        let code = match self.registry.allocate(&object_id) {
            Ok(code) => code,
            Err(e) => {
                self.discard(&object_id).await;
                return Err(e.into());
            }
        };

        let ticket = match self.scheduler.arm(&object_id, code, self.config.ttl) {
            Ok(ticket) => ticket,
            Err(e) => {
                self.registry.release_if(&code, &object_id);
                self.discard(&object_id).await;
                return Err(e.into());
            }
        };

        info!(
            object_id = %object_id,
            %code,
            size = meta.size_bytes,
            media_type = %media_type,
            expires_at = %ticket.fire_at,
            "object ingested"
        );
        Ok(IngestReceipt {
            direct_handle: DirectHandle::new(object_id.clone()),
            object_id,
            code,
            ttl_minutes: self.config.ttl_minutes(),
            expires_at: ticket.fire_at,
        })
    }

    /// Resolve an access code to its object's direct handle.
    ///
    /// Unparseable codes are reported as not found. The lookup has no side
    /// effects and does not extend the object's lifetime.
    pub fn lookup_by_code(&self, code: &str) -> VaultResult<DirectHandle> {
        let handle = AccessCode::parse(code)
            .ok()
            .and_then(|code| self.registry.resolve(&code))
            .map(DirectHandle::new);
        debug!(code, found = handle.is_some(), "code lookup");
        handle.ok_or_else(|| VaultError::NotFound(format!("code {code}")))
    }

    /// Read an object through its direct handle.
    pub async fn open(&self, object_id: &str) -> VaultResult<StoredBlob> {
        let not_found = || VaultError::NotFound(format!("object {object_id}"));
        let id = ObjectId::parse(object_id).map_err(|_| not_found())?;
        self.store.retrieve(&id).await?.ok_or_else(not_found)
    }

    /// Delete the object behind `code` ahead of its expiry.
    ///
    /// Returns `Ok(false)` if the code is unknown or the object's expiry has
    /// already fired; exactly one of revocation and expiry deletes an object.
    pub async fn revoke(&self, code: &str) -> VaultResult<bool> {
        let Ok(code) = AccessCode::parse(code) else {
            return Ok(false);
        };
        let Some(object_id) = self.registry.resolve(&code) else {
            return Ok(false);
        };
        if !self.scheduler.cancel(&object_id) {
            return Ok(false);
        }
        self.reaper.reap(&object_id, code).await?;
        info!(object_id = %object_id, %code, "object revoked");
        Ok(true)
    }

    async fn discard(&self, object_id: &ObjectId) {
        match self.store.delete(object_id).await {
            Ok(_) => warn!(object_id = %object_id, "rolled back partially ingested object"),
            Err(e) => warn!(object_id = %object_id, error = %e, "failed to roll back blob"),
        }
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("live_objects", &self.registry.len())
            .field("pending_expiries", &self.scheduler.pending())
            .field("config", &self.config)
            .finish()
    }
}
