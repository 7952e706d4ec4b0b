//! The process-wide passphrase.

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::kdf::KdfError;

/// Shared secret every container is keyed from.
///
/// Loaded once from configuration and handed to the codec at construction.
/// Zeroed on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop, Deserialize)]
#[serde(try_from = "String")]
pub struct Passphrase(String);

impl Passphrase {
    /// Wrap `value`, rejecting the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`KdfError::EmptyPassphrase`] if `value` is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, KdfError> {
        let value = value.into();
        if value.is_empty() {
            return Err(KdfError::EmptyPassphrase);
        }
        Ok(Self(value))
    }

    /// UTF-8 bytes fed to PBKDF2.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl TryFrom<String> for Passphrase {
    type Error = KdfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}
