use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use blink_types::{AccessCode, ObjectId};

/// Path prefix under which objects are served.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Primary handle to an object: the path it is served from.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct DirectHandle(ObjectId);

impl DirectHandle {
    pub fn new(object_id: ObjectId) -> Self {
        Self(object_id)
    }

    pub fn object_id(&self) -> &ObjectId {
        &self.0
    }

    /// Server-relative path, e.g. `/uploads/<id>.png`.
    pub fn path(&self) -> String {
        format!("{UPLOADS_PREFIX}{}", self.0)
    }

    /// Absolute URL under `base` (`https://host[:port][/prefix]`).
    pub fn to_url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }
}

impl fmt::Debug for DirectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectHandle({})", self.path())
    }
}

impl fmt::Display for DirectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl From<DirectHandle> for String {
    fn from(handle: DirectHandle) -> Self {
        handle.path()
    }
}

/// An upload as received from a client.
#[derive(Clone, Debug)]
pub struct Upload {
    pub bytes: Bytes,
    /// The mime type the client declared for the content.
    pub mime_type: String,
    /// The size the client declared; checked before the actual length.
    pub declared_size: u64,
    pub file_name: Option<String>,
}

impl Upload {
    /// An upload whose declared size is its actual length.
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        let bytes = bytes.into();
        Self {
            declared_size: bytes.len() as u64,
            bytes,
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = size;
        self
    }
}

/// Result of a successful ingest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IngestReceipt {
    pub object_id: ObjectId,
    pub code: AccessCode,
    pub direct_handle: DirectHandle,
    pub ttl_minutes: u64,
    pub expires_at: DateTime<Utc>,
}
