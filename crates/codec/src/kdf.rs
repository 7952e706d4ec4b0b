//! PBKDF2-HMAC-SHA1 key derivation.
//!
//! The container IV doubles as the derivation salt, so decoding re-derives the
//! exact key used at encode time from the first 16 bytes of the container.
//! Parameters are fixed by the save format: changing any of them produces
//! containers the game can no longer load.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha1::Sha1;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PBKDF2 iteration count used by the save format.
pub const ITERATIONS: u32 = 100;

/// Length of the derived AES-128 key in bytes.
pub const KEY_LEN: usize = 16;

/// Required salt length in bytes (equal to the cipher IV length).
pub const SALT_LEN: usize = 16;

/// Errors produced by key derivation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KdfError {
    /// The passphrase has no bytes.
    #[error("passphrase must not be empty")]
    EmptyPassphrase,

    /// The salt is not exactly [`SALT_LEN`] bytes.
    #[error("invalid salt length: expected {SALT_LEN} bytes, got {0}")]
    InvalidSaltLength(usize),

    /// PBKDF2 requires at least one iteration.
    #[error("iteration count must be at least 1")]
    ZeroIterations,

    /// The underlying PBKDF2 implementation rejected its input.
    #[error("key derivation failed: {0}")]
    Derivation(String),
}

/// Ephemeral AES-128 key scoped to a single encode or decode call.
///
/// Zeroed on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub(crate) fn zeroed() -> Self {
        Self([0u8; KEY_LEN])
    }

    /// Borrow the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Reject inputs the save format cannot have produced.
///
/// Both backends call this before deriving so that they fail identically.
pub fn check_params(passphrase: &[u8], salt: &[u8], iterations: u32) -> Result<(), KdfError> {
    if passphrase.is_empty() {
        return Err(KdfError::EmptyPassphrase);
    }
    if salt.len() != SALT_LEN {
        return Err(KdfError::InvalidSaltLength(salt.len()));
    }
    if iterations == 0 {
        return Err(KdfError::ZeroIterations);
    }
    Ok(())
}

/// Derive a [`DerivedKey`] from `passphrase` and `salt`.
///
/// Deterministic: identical inputs always yield the identical key.
///
/// # Errors
///
/// Returns [`KdfError`] if the passphrase is empty, the salt is not
/// [`SALT_LEN`] bytes, or `iterations` is zero.
pub fn derive_key(passphrase: &[u8], salt: &[u8], iterations: u32) -> Result<DerivedKey, KdfError> {
    check_params(passphrase, salt, iterations)?;

    let mut key = DerivedKey::zeroed();
    pbkdf2::<Hmac<Sha1>>(passphrase, salt, iterations, key.as_mut_bytes())
        .map_err(|e| KdfError::Derivation(e.to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: [u8; SALT_LEN] = *b"0123456789abcdef";

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_key(b"pw", &SALT, ITERATIONS).unwrap();
        let b = derive_key(b"pw", &SALT, ITERATIONS).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn salt_changes_key() {
        let mut other = SALT;
        other[0] ^= 1;
        let a = derive_key(b"pw", &SALT, ITERATIONS).unwrap();
        let b = derive_key(b"pw", &other, ITERATIONS).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn passphrase_changes_key() {
        let a = derive_key(b"pw", &SALT, ITERATIONS).unwrap();
        let b = derive_key(b"pW", &SALT, ITERATIONS).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn matches_rfc6070_prefix() {
        // RFC 6070, P = "password", S = "salt", c = 2 (first 16 bytes of DK).
        let mut out = [0u8; KEY_LEN];
        pbkdf2::<Hmac<Sha1>>(b"password", b"salt", 2, &mut out).unwrap();
        assert_eq!(hex::encode(out), "ea6c014dc72d6f8ccd1ed92ace1d41f0");
    }

    #[test]
    fn rejects_empty_passphrase() {
        assert_eq!(
            derive_key(b"", &SALT, ITERATIONS),
            Err(KdfError::EmptyPassphrase)
        );
    }

    #[test]
    fn rejects_short_salt() {
        assert_eq!(
            derive_key(b"pw", &SALT[..8], ITERATIONS),
            Err(KdfError::InvalidSaltLength(8))
        );
    }

    #[test]
    fn rejects_zero_iterations() {
        assert_eq!(derive_key(b"pw", &SALT, 0), Err(KdfError::ZeroIterations));
    }

    #[test]
    fn debug_is_redacted() {
        let key = DerivedKey::new([0xAB; KEY_LEN]);
        let printed = format!("{key:?}");
        assert!(!printed.contains("171"));
        assert!(printed.contains("REDACTED"));
    }
}
