//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    error::ServiceError,
    protocol::{
        DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, ErrorResponse,
        HealthResponse,
    },
};
use es3_codec::TextEncoding;
use tracing::{debug, warn};

use super::state::AppState;

const DATA_REQUIRED: &str = "Data is required";
const BASE64_REQUIRED: &str = "Base64 data is required";
const ENCRYPT_FAILED: &str = "Failed to encrypt file";
const DECRYPT_FAILED: &str = "Failed to decrypt file";

/// `POST /api/encrypt`: encrypt a save document into a base64 container.
///
/// `compress` falls back to the server's `COMPRESS_ON_ENCRYPT` default.
pub async fn encrypt(
    State(state): State<AppState>,
    body: Result<Json<EncryptRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return reject(rejection, DATA_REQUIRED),
    };
    let data = match req.data {
        Some(data) if !data.is_empty() => data,
        _ => return error_response(ServiceError::BadRequest(DATA_REQUIRED.into())),
    };
    let compress = req.compress.unwrap_or(state.compress_on_encrypt);
    debug!(bytes = data.len(), compress, "encrypt request");

    let codec = state.codec.clone();
    let result = tokio::task::spawn_blocking(move || codec.encode_transport(&data, compress)).await;

    match result {
        Ok(Ok(encrypted)) => (StatusCode::OK, Json(EncryptResponse { encrypted })).into_response(),
        Ok(Err(e)) => {
            warn!(error = %e, "encryption failed");
            error_response(ServiceError::CodecFailure(ENCRYPT_FAILED.into()))
        }
        Err(e) => {
            warn!(error = %e, "encrypt task failed");
            error_response(ServiceError::Internal(e.to_string()))
        }
    }
}

/// `POST /api/decrypt`: decrypt a base64 container (or data URI) to text.
pub async fn decrypt(
    State(state): State<AppState>,
    body: Result<Json<DecryptRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return reject(rejection, BASE64_REQUIRED),
    };
    let input = match req.base64 {
        Some(input) if !input.is_empty() => input,
        _ => return error_response(ServiceError::BadRequest(BASE64_REQUIRED.into())),
    };
    let encoding = match req.encoding.as_deref().map(str::parse::<TextEncoding>) {
        None => TextEncoding::default(),
        Some(Ok(encoding)) => encoding,
        Some(Err(e)) => return error_response(ServiceError::BadRequest(e.to_string())),
    };
    debug!(chars = input.len(), encoding = encoding.as_str(), "decrypt request");

    let codec = state.codec.clone();
    let result =
        tokio::task::spawn_blocking(move || codec.decode(input.as_str(), encoding)).await;

    match result {
        Ok(Ok(decrypted)) => (StatusCode::OK, Json(DecryptResponse { decrypted })).into_response(),
        Ok(Err(e)) => {
            warn!(error = %e, "decryption failed");
            error_response(ServiceError::CodecFailure(DECRYPT_FAILED.into()))
        }
        Err(e) => {
            warn!(error = %e, "decrypt task failed");
            error_response(ServiceError::Internal(e.to_string()))
        }
    }
}

/// `GET /health`: liveness check reporting the active backend.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        backend: state.codec.backend_kind().as_str().into(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("not found")))
}

/// Body-limit rejections keep their 413; every other JSON rejection reads as a
/// missing required field.
fn reject(rejection: JsonRejection, required: &str) -> Response {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return error_response(ServiceError::PayloadTooLarge(rejection.body_text()));
    }
    debug!(reason = %rejection.body_text(), "rejected request body");
    error_response(ServiceError::BadRequest(required.into()))
}

fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.public_message()))).into_response()
}
