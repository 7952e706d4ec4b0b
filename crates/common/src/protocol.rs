//! Request and response types exchanged with the save editor front end.
//!
//! All bodies are JSON. Field names match what the editor already sends, so
//! they are not renamed to Rust conventions.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Encrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/encrypt`.
///
/// `data` is the save document as text (usually pretty-printed JSON). It is
/// optional at the type level so a missing field becomes a 400 with a clear
/// message rather than a generic deserialisation rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncryptRequest {
    #[serde(default)]
    pub data: Option<String>,

    /// Gzip before encrypting. Falls back to the server default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,
}

/// Successful response body for `POST /api/encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    /// Standard base64 of the `IV ‖ ciphertext` container.
    pub encrypted: String,
}

// ---------------------------------------------------------------------------
// Decrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/decrypt`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecryptRequest {
    /// Base64 container, optionally as a `data:...;base64,` URI.
    #[serde(default)]
    pub base64: Option<String>,

    /// Text encoding of the decrypted payload (default `utf8`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// Successful response body for `POST /api/decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub decrypted: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description safe to expose to callers.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` once the server is accepting requests.
    pub status: String,
    /// Name of the codec backend in use (`"native"` or `"restricted"`).
    pub backend: String,
}
