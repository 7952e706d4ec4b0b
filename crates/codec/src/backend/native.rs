//! Full-capability backend built on the RustCrypto mode and KDF crates.

use super::{Backend, BackendKind};
use crate::cipher::{self, CipherError, Iv};
use crate::kdf::{self, DerivedKey, KdfError};
use crate::transport::{self, TransportError};

/// Backend with unrestricted access to native crypto and buffer operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl Backend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn derive_key(
        &self,
        passphrase: &[u8],
        salt: &[u8],
        iterations: u32,
    ) -> Result<DerivedKey, KdfError> {
        kdf::derive_key(passphrase, salt, iterations)
    }

    fn cipher_encrypt(&self, plaintext: &[u8], key: &DerivedKey, iv: &Iv) -> Vec<u8> {
        cipher::encrypt(plaintext, key, iv)
    }

    fn cipher_decrypt(
        &self,
        ciphertext: &[u8],
        key: &DerivedKey,
        iv: &Iv,
    ) -> Result<Vec<u8>, CipherError> {
        cipher::decrypt(ciphertext, key, iv)
    }

    fn bytes_to_text(&self, bytes: &[u8]) -> String {
        transport::encode(bytes)
    }

    fn text_to_bytes(&self, text: &str) -> Result<Vec<u8>, TransportError> {
        transport::decode(text)
    }
}
