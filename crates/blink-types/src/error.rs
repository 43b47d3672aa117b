use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0:?}")]
    InvalidObjectId(String),

    #[error("invalid access code: {0:?}")]
    InvalidAccessCode(String),

    #[error("invalid media type: {0:?}")]
    InvalidMediaType(String),
}
