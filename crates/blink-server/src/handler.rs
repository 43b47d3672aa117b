use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::BytesMut;
use serde_json::json;
use tracing::debug;

use blink_vault::{Upload, VaultError};

use crate::error::{ServerError, ServerResult};
use crate::response::{CodeNotFound, CodeResponse, HealthResponse, UploadResponse};
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "imageFile";

pub const OBJECT_NOT_FOUND: &str = "Image not found or link has expired (auto-deleted).";

/// `POST /upload`
///
/// The media type is checked as soon as the field header arrives, and the
/// body is rejected as soon as it grows past the limit.
pub async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<Json<UploadResponse>> {
    let mut multipart =
        multipart.map_err(|e| ServerError::BadRequest(format!("Invalid upload: {}", e.body_text())))?;
    let limit = state.vault.config().max_upload_bytes;
    let mut upload = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| multipart_error(e, limit))? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        state.vault.check_media_type(&mime_type)?;
        let file_name = field.file_name().map(str::to_string);

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
            state.vault.check_size((data.len() + chunk.len()) as u64)?;
            data.extend_from_slice(&chunk);
        }

        let mut received = Upload::new(data.freeze(), mime_type);
        if let Some(name) = file_name {
            received = received.with_file_name(name);
        }
        upload = Some(received);
        break;
    }

    let upload = upload.ok_or_else(|| ServerError::BadRequest("No image uploaded.".into()))?;
    let receipt = state.vault.ingest(upload).await?;
    Ok(Json(UploadResponse {
        url: receipt.direct_handle.to_url(&state.base_url(&headers)),
        code: receipt.code.to_string(),
        expiry: receipt.ttl_minutes,
        success: true,
    }))
}

fn multipart_error(e: MultipartError, limit: u64) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ServerError::Vault(VaultError::PayloadTooLarge { size: limit + 1, limit });
    }
    ServerError::BadRequest(format!("Invalid upload: {}", e.body_text()))
}

/// `GET /uploads/:object_id`
pub async fn object_handler(State(state): State<AppState>, Path(object_id): Path<String>) -> ServerResult<Response> {
    match state.vault.open(&object_id).await {
        Ok(blob) => Ok((
            [
                (header::CONTENT_TYPE, blob.meta.media_type.as_str().to_string()),
                (header::CACHE_CONTROL, "no-store".to_string()),
            ],
            blob.data,
        )
            .into_response()),
        Err(VaultError::NotFound(_)) => {
            debug!(%object_id, "object miss");
            Ok((StatusCode::NOT_FOUND, OBJECT_NOT_FOUND).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /code/:code`
pub async fn code_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> Response {
    match state.vault.lookup_by_code(&code) {
        Ok(handle) => Json(CodeResponse {
            url: handle.to_url(&state.base_url(&headers)),
        })
        .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, Json(CodeNotFound::default())).into_response(),
    }
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.vault.config();
    Json(json!({
        "name": "blink-server",
        "version": env!("CARGO_PKG_VERSION"),
        "max_upload_bytes": config.max_upload_bytes,
        "ttl_minutes": config.ttl_minutes(),
        "live_objects": state.vault.live_objects(),
    }))
}
