//! Expiry scheduling for Blink.
//!
//! Every accepted object gets exactly one [`ExpiryTask`]: a single-shot
//! timer armed at upload time that fires once the object's time-to-live has
//! elapsed and hands the object to an [`ExpiryHandler`] for deletion.
//!
//! # Exactly-once firing
//!
//! A task moves `Armed → Fired` or `Armed → Cancelled` through one
//! compare-and-swap on its state word. The timer and
//! [`ExpiryScheduler::cancel`] both race for that transition, so exactly one
//! of them performs the deletion and the other is a no-op.
//!
//! # Failure isolation
//!
//! Handlers run on their own Tokio task. Errors and panics are logged and
//! never reach the scheduler, other objects, or the host process.

pub mod error;
pub mod handler;
pub mod scheduler;
pub mod task;

pub use error::{ExpiryError, ExpiryResult};
pub use handler::ExpiryHandler;
pub use scheduler::{ExpiryScheduler, ExpiryTicket};
pub use task::{ExpiryTask, TaskState};
