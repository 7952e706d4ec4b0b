//! Top-level codec error.

use thiserror::Error;

use crate::cipher::CipherError;
use crate::compression::CompressionError;
use crate::encoding::EncodingError;
use crate::kdf::KdfError;
use crate::transport::TransportError;

/// Error returned by [`crate::Codec`] operations.
///
/// Decryption failures are deliberately collapsed into [`CodecError::Decode`]:
/// a wrong passphrase and a corrupted or truncated container look the same to
/// the caller.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    KeyDerivation(#[from] KdfError),

    /// The container could not be decrypted.
    #[error("failed to decode container")]
    Decode,

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl From<CipherError> for CodecError {
    fn from(_: CipherError) -> Self {
        CodecError::Decode
    }
}
