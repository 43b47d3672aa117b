use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use tokio::task::AbortHandle;
use tokio::time::Instant;

use blink_types::{AccessCode, ObjectId};

/// Lifecycle of an [`ExpiryTask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    /// Waiting for its deadline.
    Armed = 0,
    /// The timer won; the handler has been (or is being) run.
    Fired = 1,
    /// Cancelled before the timer fired; the canceller owns the deletion.
    Cancelled = 2,
}

impl TaskState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Armed,
            1 => Self::Fired,
            _ => Self::Cancelled,
        }
    }
}

/// A scheduled single-shot deletion bound to one object and its code.
pub struct ExpiryTask {
    object_id: ObjectId,
    code: AccessCode,
    fire_at: DateTime<Utc>,
    deadline: Instant,
    state: AtomicU8,
    abort: OnceLock<AbortHandle>,
}

impl ExpiryTask {
    pub(crate) fn new(
        object_id: ObjectId,
        code: AccessCode,
        fire_at: DateTime<Utc>,
        deadline: Instant,
    ) -> Self {
        Self {
            object_id,
            code,
            fire_at,
            deadline,
            state: AtomicU8::new(TaskState::Armed as u8),
            abort: OnceLock::new(),
        }
    }

    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    pub fn code(&self) -> AccessCode {
        self.code
    }

    /// Wall-clock time at which the task fires.
    pub fn fire_at(&self) -> DateTime<Utc> {
        self.fire_at
    }

    pub(crate) fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Attempt the single `Armed → outcome` transition.
    ///
    /// Returns `true` for exactly one caller over the task's lifetime.
    pub(crate) fn claim(&self, outcome: TaskState) -> bool {
        debug_assert_ne!(outcome, TaskState::Armed);
        self.state
            .compare_exchange(
                TaskState::Armed as u8,
                outcome as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn set_abort_handle(&self, handle: AbortHandle) {
        let _ = self.abort.set(handle);
    }

    /// Stop the timer if it has been spawned. Safe to call at any time.
    pub(crate) fn abort_timer(&self) {
        if let Some(handle) = self.abort.get() {
            handle.abort();
        }
    }
}

impl fmt::Debug for ExpiryTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiryTask")
            .field("object_id", &self.object_id)
            .field("code", &self.code)
            .field("fire_at", &self.fire_at)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> ExpiryTask {
        ExpiryTask::new(
            ObjectId::generate(Some("png")),
            AccessCode::parse("12345").unwrap(),
            Utc::now(),
            Instant::now(),
        )
    }

    #[test]
    fn starts_armed() {
        assert_eq!(task().state(), TaskState::Armed);
    }

    #[test]
    fn only_first_claim_wins() {
        let t = task();
        assert!(t.claim(TaskState::Fired));
        assert!(!t.claim(TaskState::Cancelled));
        assert!(!t.claim(TaskState::Fired));
        assert_eq!(t.state(), TaskState::Fired);
    }

    #[test]
    fn cancel_blocks_fire() {
        let t = task();
        assert!(t.claim(TaskState::Cancelled));
        assert!(!t.claim(TaskState::Fired));
        assert_eq!(t.state(), TaskState::Cancelled);
    }

    #[test]
    fn concurrent_claims_have_one_winner() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::Arc;

        for _ in 0..100 {
            let t = Arc::new(task());
            let wins = Arc::new(AtomicUsize::new(0));
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let t = Arc::clone(&t);
                    let wins = Arc::clone(&wins);
                    std::thread::spawn(move || {
                        let outcome = if i % 2 == 0 { TaskState::Fired } else { TaskState::Cancelled };
                        if t.claim(outcome) {
                            wins.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }
            assert_eq!(wins.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn abort_without_handle_is_noop() {
        task().abort_timer();
    }
}
