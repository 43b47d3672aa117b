use blink_types::ObjectId;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend (disk full, permission
    /// denied, ...).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A freshly generated id collided with an existing blob.
    #[error("object already exists: {0}")]
    AlreadyExists(ObjectId),

    /// The storage root is missing or not a directory.
    #[error("invalid storage root: {0}")]
    InvalidRoot(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
