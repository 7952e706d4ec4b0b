//! Capability backends the pipeline runs on.
//!
//! The encode/decode pipeline in [`crate::codec`] is written once against the
//! [`Backend`] trait. Two implementations supply the primitives:
//!
//! - [`NativeBackend`]: single-pass RustCrypto block modes, the `pbkdf2` crate
//!   and one-shot base64.
//! - [`RestrictedBackend`]: only the bare AES block function and HMAC are
//!   assumed; CBC chaining, PKCS#7 and PBKDF2 are assembled by hand and
//!   base64 conversion happens in fixed-size slices.
//!
//! Given the same IV both produce byte-identical containers, and each decodes
//! what the other encodes.

pub mod native;
pub mod restricted;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cipher::{CipherError, Iv};
use crate::compression::{self, CompressionError};
use crate::kdf::{DerivedKey, KdfError};
use crate::transport::TransportError;

pub use native::NativeBackend;
pub use restricted::RestrictedBackend;

/// Primitive operations the pipeline needs from its environment.
pub trait Backend: Send + Sync {
    /// Which implementation this is.
    fn kind(&self) -> BackendKind;

    /// PBKDF2-HMAC-SHA1 into a 128-bit key.
    fn derive_key(
        &self,
        passphrase: &[u8],
        salt: &[u8],
        iterations: u32,
    ) -> Result<DerivedKey, KdfError>;

    /// AES-128-CBC encrypt with PKCS#7 padding.
    fn cipher_encrypt(&self, plaintext: &[u8], key: &DerivedKey, iv: &Iv) -> Vec<u8>;

    /// AES-128-CBC decrypt and validate PKCS#7 padding.
    fn cipher_decrypt(
        &self,
        ciphertext: &[u8],
        key: &DerivedKey,
        iv: &Iv,
    ) -> Result<Vec<u8>, CipherError>;

    /// Gzip a payload.
    fn gzip(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        compression::compress(data)
    }

    /// Inflate a gzip payload.
    fn gunzip(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        compression::decompress(data)
    }

    /// Render container bytes as base64 transport text.
    fn bytes_to_text(&self, bytes: &[u8]) -> String;

    /// Parse base64 transport text (with or without a data-URI prefix).
    fn text_to_bytes(&self, text: &str) -> Result<Vec<u8>, TransportError>;
}

/// The configured backend name is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown codec backend: {0} (expected \"native\" or \"restricted\")")]
pub struct UnknownBackend(pub String);

/// Selector for the two [`Backend`] implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Native,
    Restricted,
}

impl BackendKind {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Native => "native",
            BackendKind::Restricted => "restricted",
        }
    }

    /// Instantiate the backend this kind names.
    pub fn build(self) -> Arc<dyn Backend> {
        match self {
            BackendKind::Native => Arc::new(NativeBackend),
            BackendKind::Restricted => Arc::new(RestrictedBackend::new()),
        }
    }
}

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(BackendKind::Native),
            "restricted" => Ok(BackendKind::Restricted),
            _ => Err(UnknownBackend(s.to_owned())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
