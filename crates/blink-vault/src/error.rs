use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("unsupported media type {0:?}: only image files are allowed")]
    UnsupportedMediaType(String),

    #[error("payload too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("storage fault: {0}")]
    Storage(#[from] blink_store::StoreError),

    #[error("access code space exhausted")]
    CodeSpaceExhausted(#[from] blink_registry::RegistryError),

    #[error("scheduling error: {0}")]
    Scheduling(#[from] blink_expiry::ExpiryError),

    #[error("not found: {0}")]
    NotFound(String),
}

impl VaultError {
    /// Errors caused by the request itself, reported without retry.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnsupportedMediaType(_) | Self::PayloadTooLarge { .. })
    }

    /// Returns `true` for the expected "unknown or expired" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type VaultResult<T> = Result<T, VaultError>;
