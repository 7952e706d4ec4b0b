//! Optional gzip layer.
//!
//! Encode compresses only when the caller asks for it. Decode never takes a
//! flag: it sniffs the first two decrypted bytes for the gzip magic number.
//! An uncompressed payload that happens to start with `1F 8B` is therefore
//! misread as gzip. The save format gives no other signal, so the heuristic
//! stays.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use thiserror::Error;

/// Leading bytes of every gzip member (RFC 1952).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// OS field written into the gzip header (3 = Unix).
const GZIP_OS_UNIX: u8 = 3;

/// Errors produced by the compression layer.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// Writing the gzip stream failed.
    #[error("gzip compression failed: {0}")]
    Compress(#[source] std::io::Error),

    /// The payload carried the gzip signature but did not inflate.
    #[error("gzip decompression failed: {0}")]
    Decompress(#[source] std::io::Error),
}

/// Returns `true` if `data` starts with [`GZIP_MAGIC`].
pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Gzip `data` at the default level with a zero mtime.
///
/// Output is deterministic for a given input, which keeps containers from both
/// backends byte-identical under the same IV.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = GzBuilder::new()
        .operating_system(GZIP_OS_UNIX)
        .write(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data).map_err(CompressionError::Compress)?;
    encoder.finish().map_err(CompressionError::Compress)
}

/// Inflate a single gzip member.
///
/// # Errors
///
/// Returns [`CompressionError::Decompress`] on a bad header, corrupt deflate
/// stream, CRC mismatch, or truncated input.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(CompressionError::Decompress)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = br#"{"players":[{"name":"a"},{"name":"b"}]}"#.repeat(50);
        let gz = compress(&data).unwrap();
        assert!(is_gzip(&gz));
        assert!(gz.len() < data.len());
        assert_eq!(decompress(&gz).unwrap(), data);
    }

    #[test]
    fn compression_is_deterministic() {
        let data = b"same bytes in, same bytes out";
        assert_eq!(compress(data).unwrap(), compress(data).unwrap());
    }

    #[test]
    fn header_has_unix_os_and_zero_mtime() {
        let gz = compress(b"x").unwrap();
        assert_eq!(&gz[4..8], &[0, 0, 0, 0]);
        assert_eq!(gz[9], GZIP_OS_UNIX);
    }

    #[test]
    fn sniffing() {
        assert!(is_gzip(&[0x1f, 0x8b, 0x08]));
        assert!(!is_gzip(&[0x1f]));
        assert!(!is_gzip(b"{}"));
        assert!(!is_gzip(&[]));
    }

    #[test]
    fn signature_without_stream_fails() {
        let err = decompress(&[0x1f, 0x8b, 0x00, 0x01]).unwrap_err();
        assert!(matches!(err, CompressionError::Decompress(_)));
    }

    #[test]
    fn truncated_stream_fails() {
        let gz = compress(&b"truncate me please".repeat(20)).unwrap();
        assert!(decompress(&gz[..gz.len() - 6]).is_err());
    }
}
