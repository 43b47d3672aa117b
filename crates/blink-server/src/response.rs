use serde::{Deserialize, Serialize};

/// Body of a successful `POST /upload`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub code: String,
    /// Minutes until the object expires.
    pub expiry: u64,
    pub success: bool,
}

/// Body of a successful `GET /code/:code`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeResponse {
    pub url: String,
}

/// Body of a `GET /code/:code` miss.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeNotFound {
    pub error: String,
}

impl Default for CodeNotFound {
    fn default() -> Self {
        Self {
            error: "Code not found or expired.".into(),
        }
    }
}

/// Error body for upload failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub success: bool,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
