//! The on-disk container: `IV (16 bytes) ‖ AES-CBC ciphertext`.

use crate::cipher::{Iv, BLOCK_LEN, IV_LEN};
use crate::transport::{self, TransportError};

/// An encrypted save file exactly as the game reads and writes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    bytes: Vec<u8>,
}

impl Container {
    pub(crate) fn assemble(iv: &Iv, ciphertext: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(IV_LEN + ciphertext.len());
        bytes.extend_from_slice(iv);
        bytes.extend_from_slice(ciphertext);
        Self { bytes }
    }

    /// Validate raw file bytes as a container.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MalformedContainer`] unless there is a full IV
    /// followed by at least one whole cipher block.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TransportError> {
        let body = bytes.len().saturating_sub(IV_LEN);
        if bytes.len() < IV_LEN + BLOCK_LEN || body % BLOCK_LEN != 0 {
            return Err(TransportError::MalformedContainer(bytes.len()));
        }
        Ok(Self { bytes })
    }

    /// Parse base64 transport text (optionally behind a `...base64,` prefix).
    pub fn from_base64(text: &str) -> Result<Self, TransportError> {
        Self::from_bytes(transport::decode(text)?)
    }

    /// The leading IV, which is also the key-derivation salt.
    pub fn iv(&self) -> Iv {
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&self.bytes[..IV_LEN]);
        iv
    }

    /// Everything after the IV.
    pub fn ciphertext(&self) -> &[u8] {
        &self.bytes[IV_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard padded base64 of the whole container.
    pub fn to_base64(&self) -> String {
        transport::encode(&self.bytes)
    }

    /// `data:application/octet-stream;base64,...` rendering.
    pub fn to_data_uri(&self) -> String {
        transport::to_data_uri(&self.bytes)
    }
}

impl AsRef<[u8]> for Container {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Split raw bytes into IV and ciphertext without validating the ciphertext.
pub(crate) fn split(bytes: &[u8]) -> Option<(Iv, &[u8])> {
    if bytes.len() < IV_LEN {
        return None;
    }
    let (head, ciphertext) = bytes.split_at(IV_LEN);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(head);
    Some((iv, ciphertext))
}

/// What [`crate::Codec::decode`] accepts.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    /// Raw container bytes, e.g. read straight from a save file.
    Container(&'a [u8]),
    /// Base64 transport text, with or without a data-URI prefix.
    Transport(&'a str),
}

impl<'a> From<&'a [u8]> for Input<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Input::Container(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Input<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Input::Container(bytes)
    }
}

impl<'a> From<&'a Container> for Input<'a> {
    fn from(container: &'a Container) -> Self {
        Input::Container(container.as_bytes())
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(text: &'a str) -> Self {
        Input::Transport(text)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(text: &'a String) -> Self {
        Input::Transport(text)
    }
}
