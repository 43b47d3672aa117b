//! Ingest and lookup for Blink.
//!
//! The [`Vault`] ties the blob store, code registry, and expiry scheduler
//! together. It is the narrow interface the HTTP layer calls into:
//!
//! - [`Vault::ingest`] validates an upload, stores it, allocates an access
//!   code, arms the object's expiry, and returns both handles. The four steps
//!   form one unit: a failure after the blob is written rolls it back.
//! - [`Vault::lookup_by_code`] resolves a code to the object's direct handle
//!   without side effects. A lookup never extends an object's lifetime.
//! - [`Vault::open`] reads an object through its direct handle.
//! - [`Vault::revoke`] deletes an object ahead of its expiry.

pub mod config;
pub mod error;
pub mod handle;
pub mod reaper;
pub mod vault;

pub use config::{VaultConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_TTL};
pub use error::{VaultError, VaultResult};
pub use handle::{DirectHandle, IngestReceipt, Upload};
pub use reaper::Reaper;
pub use vault::Vault;

// Re-export key types
pub use blink_store::{BlobStore, FsBlobStore, InMemoryBlobStore, StoredBlob};
pub use blink_types::{AccessCode, MediaType, ObjectId, ObjectMeta};
