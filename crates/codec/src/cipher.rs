//! AES-128-CBC with PKCS#7 padding.
//!
//! There is no authentication tag: the only integrity signal on decrypt is the
//! padding check. A wrong passphrase or a flipped bit may therefore still
//! produce padding-valid garbage. Callers must treat that as ordinary output,
//! not as a fault.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes128;
use thiserror::Error;

use crate::kdf::DerivedKey;

/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;

/// CBC initialisation vector length in bytes.
pub const IV_LEN: usize = 16;

/// CBC initialisation vector. Also serves as the PBKDF2 salt.
pub type Iv = [u8; IV_LEN];

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// There is nothing to decrypt.
    #[error("ciphertext is empty")]
    EmptyCiphertext,

    /// The ciphertext length is not a multiple of [`BLOCK_LEN`].
    #[error("ciphertext length {0} is not a multiple of {BLOCK_LEN}")]
    Misaligned(usize),

    /// PKCS#7 padding did not validate after decryption.
    #[error("invalid padding")]
    InvalidPadding,
}

/// Encrypt `plaintext` under `key` and `iv`, appending PKCS#7 padding.
///
/// The output is always a non-empty multiple of [`BLOCK_LEN`].
pub fn encrypt(plaintext: &[u8], key: &DerivedKey, iv: &Iv) -> Vec<u8> {
    Aes128CbcEnc::new(&(*key.as_bytes()).into(), &(*iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt `ciphertext` under `key` and `iv` and strip the PKCS#7 padding.
///
/// # Errors
///
/// Returns [`CipherError`] if the ciphertext is empty, not block-aligned, or
/// its padding does not validate.
pub fn decrypt(ciphertext: &[u8], key: &DerivedKey, iv: &Iv) -> Result<Vec<u8>, CipherError> {
    check_ciphertext(ciphertext)?;
    Aes128CbcDec::new(&(*key.as_bytes()).into(), &(*iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::InvalidPadding)
}

/// Length checks shared by both backends.
pub fn check_ciphertext(ciphertext: &[u8]) -> Result<(), CipherError> {
    if ciphertext.is_empty() {
        return Err(CipherError::EmptyCiphertext);
    }
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CipherError::Misaligned(ciphertext.len()));
    }
    Ok(())
}

/// Append PKCS#7 padding up to the next block boundary.
///
/// A full block of padding is added when `data` is already aligned.
pub fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_LEN - (data.len() % BLOCK_LEN);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    padded
}

/// Strip and validate PKCS#7 padding.
///
/// # Errors
///
/// Returns [`CipherError::InvalidPadding`] if the final byte is zero, exceeds
/// the block length, or any padding byte disagrees with it.
pub fn pkcs7_unpad(data: &[u8]) -> Result<&[u8], CipherError> {
    let Some(&last) = data.last() else {
        return Err(CipherError::InvalidPadding);
    };
    let pad_len = last as usize;
    if pad_len == 0 || pad_len > BLOCK_LEN || pad_len > data.len() {
        return Err(CipherError::InvalidPadding);
    }
    let (body, padding) = data.split_at(data.len() - pad_len);
    if padding.iter().any(|&b| b != last) {
        return Err(CipherError::InvalidPadding);
    }
    Ok(body)
}
