//! Access-code registry for Blink.
//!
//! The [`CodeRegistry`] maps short numeric [`AccessCode`]s to the
//! [`ObjectId`]s of live objects. It generates codes uniformly at random and
//! redraws on collision with a live code, with a bounded number of attempts
//! so allocation can never loop forever as the 90,000-code space fills.
//!
//! # Concurrency
//!
//! The table is a sharded concurrent map. Every operation on a code locks
//! only the shard holding that code, so:
//!
//! - `resolve` never observes a half-written mapping;
//! - two concurrent `allocate` calls never settle on the same code (claiming
//!   a code is a single vacant-entry insert);
//! - operations on unrelated codes proceed in parallel.
//!
//! [`AccessCode`]: blink_types::AccessCode
//! [`ObjectId`]: blink_types::ObjectId

pub mod error;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{CodeRegistry, DEFAULT_CAPACITY, MAX_ALLOCATION_ATTEMPTS};
