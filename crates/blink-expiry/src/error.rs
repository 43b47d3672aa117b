use std::time::Duration;

use blink_types::ObjectId;

/// Errors produced by the expiry scheduler.
#[derive(Debug, thiserror::Error)]
pub enum ExpiryError {
    /// `arm` was called outside of a Tokio runtime.
    #[error("no Tokio runtime available to drive expiry timers")]
    NoRuntime,

    /// The object already has a live expiry task.
    #[error("expiry already armed for {0}")]
    AlreadyArmed(ObjectId),

    /// The TTL cannot be represented as a deadline.
    #[error("invalid ttl: {0:?}")]
    InvalidTtl(Duration),

    /// The expiry handler failed to clean up an object.
    #[error("expiry handler failed: {0}")]
    Handler(String),
}

/// Convenience alias used throughout the expiry crate.
pub type ExpiryResult<T> = std::result::Result<T, ExpiryError>;
