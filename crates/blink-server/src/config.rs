use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use blink_vault::{VaultConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_TTL};

use crate::error::{ServerError, ServerResult};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding uploaded blobs.
    pub storage_root: PathBuf,
    /// Base for absolute URLs in responses. Derived from the `Host` header
    /// when unset.
    pub public_base_url: Option<String>,
    pub max_upload_bytes: u64,
    pub ttl_secs: u64,
    pub code_capacity: usize,
    /// Delete untracked blobs left in `storage_root` before serving.
    pub sweep_on_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let vault = VaultConfig::default();
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            storage_root: PathBuf::from("uploads"),
            public_base_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ttl_secs: DEFAULT_TTL.as_secs(),
            code_capacity: vault.code_capacity,
            sweep_on_start: true,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Replace the listening port, keeping the bind address.
    pub fn with_port(mut self, port: u16) -> Self {
        self.bind_addr.set_port(port);
        self
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn vault_config(&self) -> VaultConfig {
        VaultConfig {
            max_upload_bytes: self.max_upload_bytes,
            ttl: self.ttl(),
            code_capacity: self.code_capacity,
        }
    }

    /// Request body limit: the upload limit plus room for multipart framing.
    pub fn body_limit(&self) -> usize {
        const MULTIPART_OVERHEAD: u64 = 64 * 1024;
        usize::try_from(self.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD)).unwrap_or(usize::MAX)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.ttl_secs == 0 {
            return Err(ServerError::Config("ttl_secs must be positive".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ServerError::Config("max_upload_bytes must be positive".into()));
        }
        if self.code_capacity == 0 {
            return Err(ServerError::Config("code_capacity must be positive".into()));
        }
        if let Some(base) = &self.public_base_url {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ServerError::Config(format!(
                    "public_base_url must start with http:// or https://: {base}"
                )));
            }
        }
        Ok(())
    }
}
