//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::PayloadTooLarge`] → 413
/// - [`ServiceError::CodecFailure`] → 500
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: invalid JSON, a missing field, or an unknown encoding.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the configured size limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Encoding or decoding a container failed. The message is the only thing
    /// the caller sees; the cause is logged server-side.
    #[error("codec failure: {0}")]
    CodecFailure(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::PayloadTooLarge(_) => 413,
            ServiceError::CodecFailure(_) => 500,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Message safe to put in a response body.
    pub fn public_message(&self) -> &str {
        match self {
            ServiceError::BadRequest(msg)
            | ServiceError::PayloadTooLarge(msg)
            | ServiceError::CodecFailure(msg) => msg,
            ServiceError::Internal(_) => "internal error",
        }
    }
}
