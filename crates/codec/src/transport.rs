//! Base64 transport rendering of a container.
//!
//! Containers cross JSON boundaries as standard padded base64, optionally
//! behind a data-URI prefix such as `data:application/octet-stream;base64,`.
//! Decoding is forgiving in the same ways a browser's `atob` is: ASCII
//! whitespace is skipped and missing `=` padding is accepted.
//!
//! The chunked variants process the input in fixed-size slices and
//! concatenate the partial results. Their output is identical to the
//! single-pass functions for every input and every chunk size.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use thiserror::Error;

/// Everything up to and including this marker is discarded before decoding.
pub const MARKER: &str = "base64,";

/// Prefix produced by [`to_data_uri`].
pub const DATA_URI_PREFIX: &str = "data:application/octet-stream;base64,";

/// Slice size used by the restricted backend.
pub const CHUNK_LEN: usize = 8192;

const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors produced while turning transport text back into bytes.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The text is not valid base64.
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The decoded bytes cannot be an `IV ‖ ciphertext` container.
    #[error("malformed container: {0} bytes")]
    MalformedContainer(usize),
}

/// Return the base64 payload of `text`, dropping a data-URI style prefix.
///
/// With more than one marker only the segment between the first and second
/// is kept.
pub fn strip_marker(text: &str) -> &str {
    let mut segments = text.split(MARKER);
    match (segments.next(), segments.next()) {
        (Some(_), Some(payload)) => payload,
        _ => text,
    }
}

/// Encode `bytes` as standard padded base64 in one pass.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Encode `bytes` as base64, converting at most `chunk_len` input bytes at a
/// time.
///
/// Bytes that do not fill a whole 3-byte group are carried into the next
/// slice so no padding appears mid-stream.
pub fn encode_chunked(bytes: &[u8], chunk_len: usize) -> String {
    let chunk_len = chunk_len.max(1);
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    let mut carry: Vec<u8> = Vec::with_capacity(chunk_len + 2);

    for slice in bytes.chunks(chunk_len) {
        carry.extend_from_slice(slice);
        let whole = carry.len() - carry.len() % 3;
        STANDARD.encode_string(&carry[..whole], &mut out);
        carry.drain(..whole);
    }
    if !carry.is_empty() {
        STANDARD.encode_string(&carry, &mut out);
    }
    out
}

/// Decode base64 `text`, after stripping any marker prefix.
///
/// # Errors
///
/// Returns [`TransportError::InvalidBase64`] on characters outside the
/// standard alphabet or an impossible length.
pub fn decode(text: &str) -> Result<Vec<u8>, TransportError> {
    let cleaned = clean(strip_marker(text));
    Ok(FORGIVING.decode(cleaned)?)
}

/// Decode base64 `text` in slices of at most `chunk_len` characters.
///
/// `chunk_len` is rounded down to a multiple of four so every slice but the
/// last is a run of complete quads.
pub fn decode_chunked(text: &str, chunk_len: usize) -> Result<Vec<u8>, TransportError> {
    let cleaned = clean(strip_marker(text));
    let chunk_len = (chunk_len - chunk_len % 4).max(4);
    let mut out = Vec::with_capacity(cleaned.len() / 4 * 3);
    for slice in cleaned.as_bytes().chunks(chunk_len) {
        FORGIVING.decode_vec(slice, &mut out)?;
    }
    Ok(out)
}

/// Render `bytes` behind [`DATA_URI_PREFIX`].
pub fn to_data_uri(bytes: &[u8]) -> String {
    format!("{DATA_URI_PREFIX}{}", encode(bytes))
}

fn clean(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}
