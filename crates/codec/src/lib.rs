//! Codec for Easy Save 3 (`.es3`) encrypted save containers.
//!
//! A container is `IV (16 bytes) ‖ AES-128-CBC(PKCS#7) ciphertext`, keyed with
//! PBKDF2-HMAC-SHA1 (100 iterations) over a shared passphrase using the IV as
//! salt. The plaintext may be gzip-compressed; decode detects that from the
//! gzip magic bytes rather than from any flag.
//!
//! # Modules
//!
//! - [`kdf`]: key derivation
//! - [`cipher`]: AES-128-CBC and PKCS#7
//! - [`compression`]: gzip and signature sniffing
//! - [`transport`]: base64 / data-URI rendering
//! - [`container`]: the byte layout
//! - [`backend`]: native and restricted primitive providers
//! - [`codec`]: the pipeline

pub mod backend;
pub mod cipher;
pub mod codec;
pub mod compression;
pub mod container;
pub mod encoding;
pub mod error;
pub mod kdf;
pub mod passphrase;
pub mod transport;

pub use backend::{Backend, BackendKind, NativeBackend, RestrictedBackend};
pub use codec::{Codec, Opened};
pub use container::{Container, Input};
pub use encoding::TextEncoding;
pub use error::CodecError;
pub use passphrase::Passphrase;

/// Encrypt `text` under `passphrase` on the native backend.
///
/// # Errors
///
/// Returns [`CodecError::KeyDerivation`] for an empty passphrase, or
/// [`CodecError::Compression`] if gzip fails.
pub fn encode(text: &str, passphrase: &str, compress: bool) -> Result<Container, CodecError> {
    Codec::new(Passphrase::new(passphrase)?, backend::BackendKind::Native.build())
        .encode(text, compress)
}

/// Decrypt a container (raw bytes or base64 text) on the native backend.
pub fn decode<'a>(
    input: impl Into<Input<'a>>,
    passphrase: &str,
    encoding: TextEncoding,
) -> Result<String, CodecError> {
    Codec::new(Passphrase::new(passphrase)?, backend::BackendKind::Native.build())
        .decode(input, encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_functions_round_trip() {
        let container = encode("hello world", "pw", false).unwrap();
        assert_eq!(container.len(), 32);
        assert_eq!(
            decode(&container, "pw", TextEncoding::Utf8).unwrap(),
            "hello world"
        );
        assert_eq!(
            decode(container.to_base64().as_str(), "pw", TextEncoding::default()).unwrap(),
            "hello world"
        );
    }

    #[test]
    fn empty_passphrase_is_a_key_derivation_error() {
        assert!(matches!(
            encode("x", "", false),
            Err(CodecError::KeyDerivation(_))
        ));
    }
}
