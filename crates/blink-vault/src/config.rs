use std::time::Duration;

use blink_registry::DEFAULT_CAPACITY;

/// Largest accepted upload: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Lifetime of every object: 10 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Limits applied by the [`Vault`](crate::Vault).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultConfig {
    pub max_upload_bytes: u64,
    pub ttl: Duration,
    /// Maximum number of simultaneously live access codes.
    pub code_capacity: usize,
}

impl VaultConfig {
    /// TTL in whole minutes, as shown to clients.
    pub fn ttl_minutes(&self) -> u64 {
        self.ttl.as_secs() / 60
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ttl: DEFAULT_TTL,
            code_capacity: DEFAULT_CAPACITY,
        }
    }
}
