//! Blob storage for Blink.
//!
//! The blob store owns the bytes of every uploaded object. Each `store`
//! call writes the content under a freshly generated [`ObjectId`], so two
//! uploads never share a storage key, and the store can later retrieve or
//! delete the blob by that id.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`FsBlobStore`] -- one file per object under a root directory
//! - [`InMemoryBlobStore`] -- `DashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Object ids are generated by the store, never supplied by callers.
//! 2. A blob becomes visible only after its bytes are fully written.
//! 3. Deleting an absent object is `Ok(false)`, never an error.
//! 4. Write-path I/O errors are propagated to the caller.
//!
//! [`ObjectId`]: blink_types::ObjectId

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::{FsBlobStore, SweepReport};
pub use memory::InMemoryBlobStore;
pub use traits::{storage_extension, BlobStore, StoredBlob};
