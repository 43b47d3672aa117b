use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::media::MediaType;
use crate::object::ObjectId;

/// Metadata recorded for every stored object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub object_id: ObjectId,
    pub size_bytes: u64,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
}

impl ObjectMeta {
    /// Metadata for an object created now.
    pub fn new(object_id: ObjectId, size_bytes: u64, media_type: MediaType) -> Self {
        Self {
            object_id,
            size_bytes,
            media_type,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let meta = ObjectMeta::new(
            ObjectId::generate(Some("png")),
            2048,
            MediaType::parse("image/png").unwrap(),
        );
        let json = serde_json::to_string(&meta).unwrap();
        let back: ObjectMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
