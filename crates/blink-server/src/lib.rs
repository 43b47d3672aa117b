//! HTTP server for Blink.
//!
//! Accepts image uploads, serves them back through their direct link, and
//! resolves short access codes to those links until the object expires.

pub mod config;
pub mod error;
pub mod handler;
pub mod response;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use response::{CodeNotFound, CodeResponse, ErrorBody, UploadResponse};
pub use server::BlinkServer;
pub use state::AppState;
