use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, error, info};

use blink_types::{AccessCode, ObjectId};

use crate::error::{ExpiryError, ExpiryResult};
use crate::handler::ExpiryHandler;
use crate::task::{ExpiryTask, TaskState};

type TaskTable = DashMap<ObjectId, Arc<ExpiryTask>>;

/// Receipt for an armed expiry task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpiryTicket {
    pub object_id: ObjectId,
    pub code: AccessCode,
    pub fire_at: DateTime<Utc>,
}

/// Owns one single-shot timer per live object.
///
/// Each armed task runs as its own Tokio task, sleeping on the runtime's
/// timer until its deadline. Timers are detached from the scheduler value:
/// dropping the scheduler does not cancel pending expiries, which keep
/// running until they fire or the process exits.
pub struct ExpiryScheduler {
    handler: Arc<dyn ExpiryHandler>,
    tasks: Arc<TaskTable>,
}

impl ExpiryScheduler {
    pub fn new(handler: Arc<dyn ExpiryHandler>) -> Self {
        Self {
            handler,
            tasks: Arc::new(DashMap::new()),
        }
    }

    /// Arm the expiry task for `object_id`, firing once `ttl` has elapsed.
    ///
    /// Must be called from within a Tokio runtime. Fails with
    /// [`ExpiryError::AlreadyArmed`] if the object already has a pending
    /// task.
    pub fn arm(&self, object_id: &ObjectId, code: AccessCode, ttl: Duration) -> ExpiryResult<ExpiryTicket> {
        let runtime = Handle::try_current().map_err(|_| ExpiryError::NoRuntime)?;
        let deadline = Instant::now()
            .checked_add(ttl)
            .ok_or(ExpiryError::InvalidTtl(ttl))?;
        let fire_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| Utc::now().checked_add_signed(d))
            .ok_or(ExpiryError::InvalidTtl(ttl))?;

        let task = Arc::new(ExpiryTask::new(object_id.clone(), code, fire_at, deadline));
        match self.tasks.entry(object_id.clone()) {
            Entry::Occupied(_) => return Err(ExpiryError::AlreadyArmed(object_id.clone())),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&task));
            }
        }

        let timer = runtime.spawn(run_timer(
            Arc::clone(&task),
            Arc::clone(&self.handler),
            Arc::clone(&self.tasks),
        ));
        task.set_abort_handle(timer.abort_handle());
        if task.state() == TaskState::Cancelled {
            // Cancelled between insertion and spawn.
            timer.abort();
        }

        debug!(object_id = %object_id, %code, %fire_at, "expiry armed");
        Ok(ExpiryTicket {
            object_id: object_id.clone(),
            code,
            fire_at,
        })
    }

    /// Cancel a pending expiry.
    ///
    /// Returns `true` if the cancellation won the race against the timer; the
    /// caller then owns the object's deletion. Returns `false` if the task has
    /// already fired or no task exists.
    pub fn cancel(&self, object_id: &ObjectId) -> bool {
        let Some(task) = self.tasks.get(object_id).map(|t| Arc::clone(t.value())) else {
            return false;
        };
        if !task.claim(TaskState::Cancelled) {
            return false;
        }
        task.abort_timer();
        self.tasks.remove_if(object_id, |_, t| Arc::ptr_eq(t, &task));
        debug!(object_id = %object_id, "expiry cancelled");
        true
    }

    /// Number of tasks still waiting to fire.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if `object_id` has a task waiting to fire.
    pub fn is_armed(&self, object_id: &ObjectId) -> bool {
        self.tasks.contains_key(object_id)
    }

    /// When the pending task for `object_id` fires, if there is one.
    pub fn fire_at(&self, object_id: &ObjectId) -> Option<DateTime<Utc>> {
        self.tasks.get(object_id).map(|t| t.fire_at())
    }
}

impl std::fmt::Debug for ExpiryScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryScheduler")
            .field("pending", &self.tasks.len())
            .finish()
    }
}

async fn run_timer(task: Arc<ExpiryTask>, handler: Arc<dyn ExpiryHandler>, tasks: Arc<TaskTable>) {
    tokio::time::sleep_until(task.deadline()).await;

    if !task.claim(TaskState::Fired) {
        return;
    }
    tasks.remove_if(task.object_id(), |_, t| Arc::ptr_eq(t, &task));

    let object_id = task.object_id().clone();
    let code = task.code();
    let cleanup = {
        let object_id = object_id.clone();
        tokio::spawn(async move { handler.on_expire(&object_id, code).await })
    };

    match cleanup.await {
        Ok(Ok(())) => info!(object_id = %object_id, %code, "object expired"),
        Ok(Err(e)) => error!(object_id = %object_id, %code, error = %e, "expiry cleanup failed"),
        Err(e) if e.is_panic() => error!(object_id = %object_id, %code, "expiry handler panicked"),
        Err(e) => error!(object_id = %object_id, %code, error = %e, "expiry handler aborted"),
    }
}
