//! Restricted-capability backend.
//!
//! Assumes nothing beyond a single-block AES primitive, HMAC-SHA1 and a
//! base64 routine that may only see bounded slices of input. Everything else
//! (CBC chaining, PKCS#7, the PBKDF2 loop, slice-wise transport conversion) is
//! done here by hand.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Block};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::{Backend, BackendKind};
use crate::cipher::{self, CipherError, Iv, BLOCK_LEN};
use crate::kdf::{self, DerivedKey, KdfError};
use crate::transport::{self, TransportError, CHUNK_LEN};

type HmacSha1 = Hmac<Sha1>;

/// HMAC-SHA1 output length.
const SHA1_LEN: usize = 20;

/// Backend for environments without block-mode, KDF or bulk base64 support.
#[derive(Debug, Clone, Copy)]
pub struct RestrictedBackend {
    chunk_len: usize,
}

impl RestrictedBackend {
    /// Backend converting transport text in [`CHUNK_LEN`]-byte slices.
    pub fn new() -> Self {
        Self {
            chunk_len: CHUNK_LEN,
        }
    }

    /// Backend converting transport text in `chunk_len`-byte slices.
    pub fn with_chunk_len(chunk_len: usize) -> Self {
        Self {
            chunk_len: chunk_len.max(1),
        }
    }
}

impl Default for RestrictedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for RestrictedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Restricted
    }

    fn derive_key(
        &self,
        passphrase: &[u8],
        salt: &[u8],
        iterations: u32,
    ) -> Result<DerivedKey, KdfError> {
        kdf::check_params(passphrase, salt, iterations)?;
        let mut key = DerivedKey::zeroed();
        pbkdf2_hmac_sha1(passphrase, salt, iterations, key.as_mut_bytes())?;
        Ok(key)
    }

    fn cipher_encrypt(&self, plaintext: &[u8], key: &DerivedKey, iv: &Iv) -> Vec<u8> {
        let aes = Aes128::new(&(*key.as_bytes()).into());
        let mut buf = cipher::pkcs7_pad(plaintext);
        let mut prev = *iv;
        for chunk in buf.chunks_exact_mut(BLOCK_LEN) {
            let mut block = Block::default();
            for ((b, &p), &c) in block.iter_mut().zip(prev.iter()).zip(chunk.iter()) {
                *b = p ^ c;
            }
            aes.encrypt_block(&mut block);
            chunk.copy_from_slice(&block);
            prev.copy_from_slice(&block);
        }
        buf
    }

    fn cipher_decrypt(
        &self,
        ciphertext: &[u8],
        key: &DerivedKey,
        iv: &Iv,
    ) -> Result<Vec<u8>, CipherError> {
        cipher::check_ciphertext(ciphertext)?;
        let aes = Aes128::new(&(*key.as_bytes()).into());
        let mut buf = Vec::with_capacity(ciphertext.len());
        let mut prev = *iv;
        for chunk in ciphertext.chunks_exact(BLOCK_LEN) {
            let mut block = Block::default();
            block.copy_from_slice(chunk);
            aes.decrypt_block(&mut block);
            buf.extend(block.iter().zip(prev.iter()).map(|(d, p)| d ^ p));
            prev.copy_from_slice(chunk);
        }
        let plain_len = cipher::pkcs7_unpad(&buf)?.len();
        buf.truncate(plain_len);
        Ok(buf)
    }

    fn bytes_to_text(&self, bytes: &[u8]) -> String {
        transport::encode_chunked(bytes, self.chunk_len)
    }

    fn text_to_bytes(&self, text: &str) -> Result<Vec<u8>, TransportError> {
        transport::decode_chunked(text, self.chunk_len)
    }
}

/// PBKDF2 (RFC 8018) with HMAC-SHA1 as the PRF, filling `out`.
///
/// # Errors
///
/// Returns [`KdfError::Derivation`] if HMAC rejects the key.
pub fn pbkdf2_hmac_sha1(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
    out: &mut [u8],
) -> Result<(), KdfError> {
    let prf = <HmacSha1 as KeyInit>::new_from_slice(passphrase)
        .map_err(|e| KdfError::Derivation(e.to_string()))?;

    for (index, dk_block) in out.chunks_mut(SHA1_LEN).enumerate() {
        let block_number = u32::try_from(index + 1)
            .map_err(|_| KdfError::Derivation("derived key too long".into()))?;

        let mut mac = prf.clone();
        mac.update(salt);
        mac.update(&block_number.to_be_bytes());
        let mut u = mac.finalize().into_bytes();
        let mut t = u;

        for _ in 1..iterations {
            let mut mac = prf.clone();
            mac.update(&u);
            u = mac.finalize().into_bytes();
            t.iter_mut().zip(u.iter()).for_each(|(t, u)| *t ^= u);
        }

        dk_block.copy_from_slice(&t[..dk_block.len()]);
    }
    Ok(())
}
