use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use blink_vault::VaultError;

use crate::response::ErrorBody;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("{0}")]
    BadRequest(String),

    #[error("store error: {0}")]
    Store(#[from] blink_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Vault(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Vault(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let message = match &self {
            Self::Vault(e) if status.is_server_error() => match e {
                VaultError::CodeSpaceExhausted(_) => "Server is busy, please try again later.".to_string(),
                _ => "Failed to store the image.".to_string(),
            },
            _ if status.is_server_error() => "Internal server error.".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
