//! Error types for registry operations.

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No free code could be claimed: the number of live codes is at or near
    /// the size of the code space.
    #[error("access code space exhausted ({live} live codes, capacity {capacity})")]
    CodeSpaceExhausted { live: usize, capacity: usize },
}

/// Convenience type alias for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
