//! Text encodings accepted when turning a decoded payload back into a string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The requested text encoding is not supported.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported text encoding: {0}")]
pub struct EncodingError(pub String);

/// Encoding used to interpret decrypted payload bytes.
///
/// Decoding follows the WHATWG `TextDecoder` the save editor reads with:
/// malformed sequences become U+FFFD rather than an error, a leading
/// byte-order mark is consumed, and the single-byte labels (`latin1`,
/// `binary`, `ascii`) all mean windows-1252.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16le,
    Latin1,
    Ascii,
}

impl TextEncoding {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Utf16le => "utf16le",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Ascii => "ascii",
        }
    }

    /// Interpret `bytes` as text in this encoding.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                String::from_utf8_lossy(bytes).into_owned()
            }
            TextEncoding::Utf16le => {
                let bytes = bytes.strip_prefix(UTF16LE_BOM).unwrap_or(bytes);
                // A dangling odd byte is dropped.
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
            TextEncoding::Latin1 | TextEncoding::Ascii => {
                bytes.iter().map(|&b| windows_1252(b)).collect()
            }
        }
    }
}

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];
const UTF16LE_BOM: &[u8] = &[0xff, 0xfe];

/// Code points for bytes 0x80..=0x9F; every other byte maps to itself.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20ac}', '\u{0081}', '\u{201a}', '\u{0192}', '\u{201e}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02c6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008d}', '\u{017d}', '\u{008f}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02dc}', '\u{2122}', '\u{0161}', '\u{203a}', '\u{0153}', '\u{009d}', '\u{017e}', '\u{0178}',
];

fn windows_1252(byte: u8) -> char {
    match byte {
        0x80..=0x9f => WINDOWS_1252_HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

impl FromStr for TextEncoding {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(TextEncoding::Utf16le),
            "latin1" | "binary" => Ok(TextEncoding::Latin1),
            "ascii" => Ok(TextEncoding::Ascii),
            _ => Err(EncodingError(s.to_owned())),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("utf8".parse::<TextEncoding>(), Ok(TextEncoding::Utf8));
        assert_eq!("UTF-8".parse::<TextEncoding>(), Ok(TextEncoding::Utf8));
        assert_eq!("ucs2".parse::<TextEncoding>(), Ok(TextEncoding::Utf16le));
        assert_eq!("binary".parse::<TextEncoding>(), Ok(TextEncoding::Latin1));
        assert_eq!(
            "ebcdic".parse::<TextEncoding>(),
            Err(EncodingError("ebcdic".into()))
        );
    }

    #[test]
    fn utf8_is_lossy() {
        assert_eq!(TextEncoding::Utf8.decode("héllo".as_bytes()), "héllo");
        assert_eq!(TextEncoding::Utf8.decode(&[b'a', 0xff]), "a\u{fffd}");
    }

    #[test]
    fn utf16le() {
        let bytes: Vec<u8> = "hi✓".encode_utf16().flat_map(u16::to_le_bytes).collect();
        assert_eq!(TextEncoding::Utf16le.decode(&bytes), "hi✓");
        assert_eq!(TextEncoding::Utf16le.decode(&[b'a', 0, b'b']), "a");
    }

    #[test]
    fn utf8_bom_is_consumed() {
        let bytes = "\u{feff}{\"a\":1}".as_bytes();
        assert_eq!(TextEncoding::Utf8.decode(bytes), "{\"a\":1}");
        // Only one leading mark is consumed.
        let twice = "\u{feff}\u{feff}x".as_bytes();
        assert_eq!(TextEncoding::Utf8.decode(twice), "\u{feff}x");
        assert_eq!(TextEncoding::Utf8.decode(b"x\xef\xbb\xbf"), "x\u{feff}");
    }

    #[test]
    fn utf16le_bom_is_consumed() {
        let mut bytes = vec![0xff, 0xfe];
        bytes.extend("{}".encode_utf16().flat_map(u16::to_le_bytes));
        assert_eq!(TextEncoding::Utf16le.decode(&bytes), "{}");
    }

    #[test]
    fn single_byte_encodings_are_windows_1252() {
        assert_eq!(TextEncoding::Latin1.decode(&[0x41, 0xe9]), "Aé");
        assert_eq!(TextEncoding::Ascii.decode(&[0x41, 0xc1]), "AÁ");
        assert_eq!(TextEncoding::Latin1.decode(&[0x80, 0x99, 0x9f]), "€™Ÿ");
        assert_eq!(TextEncoding::Ascii.decode(&[0x81, 0x8d]), "\u{0081}\u{008d}");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&TextEncoding::Utf16le).unwrap();
        assert_eq!(json, "\"utf16le\"");
        assert_eq!(TextEncoding::default().to_string(), "utf8");
    }
}
