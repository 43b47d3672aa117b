//! Filesystem-backed blob store.
//!
//! [`FsBlobStore`] keeps one file per object directly under its root
//! directory, named by the object's id. Metadata (media type, size, creation
//! time) lives in an in-memory index: the store is volatile by design, and
//! files surviving a restart are orphans that [`FsBlobStore::sweep_orphans`]
//! reclaims once they are older than the TTL.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use blink_types::{MediaType, ObjectId, ObjectMeta};

use crate::error::{StoreError, StoreResult};
use crate::traits::{storage_extension, BlobStore, StoredBlob};

/// Result of an orphan sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Directory entries examined.
    pub scanned: usize,
    /// Orphaned blobs deleted.
    pub removed: usize,
    /// Bytes reclaimed by the deleted blobs.
    pub bytes_freed: u64,
    /// Orphans that could not be deleted.
    pub failed: usize,
    /// Untracked blobs left alone because they are younger than the age bound.
    pub kept_recent: usize,
}

/// Tracks an in-flight write. Unless kept, dropping it removes the file, so
/// a cancelled or failed write leaves nothing behind; either way the id
/// leaves the `writing` set.
struct PendingWrite<'a> {
    writing: &'a DashSet<ObjectId>,
    id: ObjectId,
    path: PathBuf,
    keep: bool,
}

impl<'a> PendingWrite<'a> {
    fn start(writing: &'a DashSet<ObjectId>, id: ObjectId, path: PathBuf) -> Self {
        writing.insert(id.clone());
        Self {
            writing,
            id,
            path,
            keep: false,
        }
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        if !self.keep {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != ErrorKind::NotFound {
                    warn!(object_id = %self.id, error = %e, "failed to remove partial blob");
                }
            }
        }
        self.writing.remove(&self.id);
    }
}

/// Blob store writing one file per object under `root`.
pub struct FsBlobStore {
    root: PathBuf,
    index: DashMap<ObjectId, ObjectMeta>,
    writing: DashSet<ObjectId>,
}

impl FsBlobStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        let metadata = tokio::fs::metadata(&root).await?;
        if !metadata.is_dir() {
            return Err(StoreError::InvalidRoot(root.display().to_string()));
        }
        info!(root = %root.display(), "blob store opened");
        Ok(Self {
            root,
            index: DashMap::new(),
            writing: DashSet::new(),
        })
    }

    /// The storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &ObjectId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Delete blob files under the root that the live index does not track
    /// and that were last modified at least `min_age` ago.
    ///
    /// Only files whose names are valid object ids are considered; anything
    /// else in the directory is left alone. Blobs being written concurrently
    /// are skipped. Another store on the same root may still serve files this
    /// one does not track; with `min_age` set to the TTL only expired files
    /// qualify.
    pub async fn sweep_orphans(&self, min_age: Duration) -> StoreResult<SweepReport> {
        let mut report = SweepReport::default();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let now = SystemTime::now();

        while let Some(entry) = entries.next_entry().await? {
            report.scanned += 1;
            let Some(id) = entry.file_name().to_str().and_then(|n| ObjectId::parse(n).ok()) else {
                continue;
            };
            if self.index.contains_key(&id) || self.writing.contains(&id) {
                continue;
            }
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if !metadata.is_file() {
                continue;
            }
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or(Duration::ZERO);
            if age < min_age {
                report.kept_recent += 1;
                continue;
            }

            let size = metadata.len();
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    debug!(object_id = %id, size, age_secs = age.as_secs(), "removed orphaned blob");
                    report.removed += 1;
                    report.bytes_freed += size;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(object_id = %id, error = %e, "failed to remove orphaned blob");
                    report.failed += 1;
                }
            }
        }

        if report.removed > 0 || report.failed > 0 {
            warn!(
                removed = report.removed,
                failed = report.failed,
                kept_recent = report.kept_recent,
                bytes_freed = report.bytes_freed,
                "orphan sweep reclaimed stale blobs"
            );
        }
        Ok(report)
    }

    async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        file.write_all(data).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(
        &self,
        data: Bytes,
        media_type: &MediaType,
        original_name: Option<&str>,
    ) -> StoreResult<ObjectMeta> {
        let extension = storage_extension(media_type, original_name);
        let id = ObjectId::generate(Some(&extension));
        let path = self.path_for(&id);

        let pending = PendingWrite::start(&self.writing, id.clone(), path.clone());
        match Self::write_file(&path, &data).await {
            Ok(()) => {
                let meta = ObjectMeta::new(id.clone(), data.len() as u64, media_type.clone());
                self.index.insert(id.clone(), meta.clone());
                pending.keep();
                debug!(object_id = %id, size = meta.size_bytes, "blob written");
                Ok(meta)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                // The file belongs to someone else.
                pending.keep();
                Err(StoreError::AlreadyExists(id))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn retrieve(&self, id: &ObjectId) -> StoreResult<Option<StoredBlob>> {
        let Some(meta) = self.index.get(id).map(|m| m.value().clone()) else {
            return Ok(None);
        };
        match tokio::fs::read(self.path_for(id)).await {
            Ok(data) => Ok(Some(StoredBlob {
                meta,
                data: Bytes::from(data),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let tracked = self.index.remove(id).is_some();
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(tracked),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        if !self.index.contains_key(id) {
            return Ok(false);
        }
        Ok(tokio::fs::try_exists(self.path_for(id)).await?)
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

impl std::fmt::Debug for FsBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsBlobStore")
            .field("root", &self.root)
            .field("object_count", &self.index.len())
            .finish()
    }
}
