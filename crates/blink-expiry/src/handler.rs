use async_trait::async_trait;

use blink_types::{AccessCode, ObjectId};

use crate::error::ExpiryResult;

/// Deletion action run when an object's TTL elapses.
///
/// Called at most once per armed task. An `Err` is logged by the scheduler
/// and otherwise ignored; implementations should still release whatever
/// they can before returning it.
#[async_trait]
pub trait ExpiryHandler: Send + Sync + 'static {
    async fn on_expire(&self, object_id: &ObjectId, code: AccessCode) -> ExpiryResult<()>;
}
