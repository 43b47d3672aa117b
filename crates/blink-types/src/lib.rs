//! Foundation types for Blink, an ephemeral image drop.
//!
//! Every uploaded object is reachable through two independent handles: an
//! opaque [`ObjectId`] (the direct link) and a short, human-typeable
//! [`AccessCode`]. Both become invalid when the object's time-to-live
//! elapses. Every other Blink crate depends on `blink-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Opaque, collision-free storage key (UUIDv7 + extension)
//! - [`AccessCode`]: 5-digit numeric code in `[10000, 99999]`
//! - [`MediaType`]: Parsed declared mime type with image-family checks
//! - [`ObjectMeta`]: Size, media type, and creation time of a stored object

pub mod code;
pub mod error;
pub mod media;
pub mod meta;
pub mod object;

pub use code::AccessCode;
pub use error::TypeError;
pub use media::MediaType;
pub use meta::ObjectMeta;
pub use object::ObjectId;
