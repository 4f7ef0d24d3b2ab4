//! Turning raw CSV bytes into text.
//!
//! Spreadsheets on Japanese Windows still save CSV as Shift_JIS, so bytes
//! that are not valid UTF-8 get a second attempt before the import fails.

use std::fmt;

use encoding_rs::SHIFT_JIS;
use tracing::debug;

use carefind_contracts::error::{CarefindError, CarefindResult};

/// Encoding a CSV file was successfully decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    ShiftJis,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::ShiftJis => "Shift_JIS",
        })
    }
}

/// Decode as UTF-8, falling back to Shift_JIS. A leading byte-order mark is
/// removed. Fails with `MalformedInput` when neither decoding is clean.
pub fn decode_csv_bytes(bytes: &[u8]) -> CarefindResult<(String, TextEncoding)> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        return Ok((text.to_string(), TextEncoding::Utf8));
    }

    debug!("CSV is not valid UTF-8, retrying as Shift_JIS");
    match SHIFT_JIS.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => Ok((text.into_owned(), TextEncoding::ShiftJis)),
        None => Err(CarefindError::MalformedInput {
            reason: "file is neither UTF-8 nor Shift_JIS; save it in one of those encodings"
                .to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_with_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("施設名".as_bytes());
        let (text, enc) = decode_csv_bytes(&bytes).unwrap();
        assert_eq!(text, "施設名");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn shift_jis_fallback() {
        let (encoded, _, had_errors) = SHIFT_JIS.encode("施設名,住所\n");
        assert!(!had_errors);
        let (text, enc) = decode_csv_bytes(&encoded).unwrap();
        assert_eq!(text, "施設名,住所\n");
        assert_eq!(enc, TextEncoding::ShiftJis);
    }

    #[test]
    fn undecodable_bytes() {
        // 0xFF is neither a UTF-8 nor a Shift_JIS byte.
        let err = decode_csv_bytes(&[0x41, 0xFF, 0x42]).unwrap_err();
        assert!(matches!(err, CarefindError::MalformedInput { .. }));
    }
}
