use std::sync::Arc;

use axum::http::{header, HeaderMap};

use blink_vault::Vault;

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub vault: Arc<Vault>,
    pub public_base_url: Option<String>,
}

impl AppState {
    pub fn new(vault: Arc<Vault>, public_base_url: Option<String>) -> Self {
        Self {
            vault,
            public_base_url,
        }
    }

    /// Base for absolute URLs: the configured one, else the request's host.
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(base) = &self.public_base_url {
            return base.trim_end_matches('/').to_string();
        }
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .filter(|p| *p == "https")
            .unwrap_or("http");
        format!("{scheme}://{host}")
    }
}
