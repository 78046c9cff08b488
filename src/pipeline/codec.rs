//! Base64 codec adapter: standard alphabet only.
//!
//! Payloads come from hand-edited sidecars and pasted documents, so decoding
//! skips CR/LF line breaks and tolerates non-zero trailing bits. Padding is
//! still required and the URL-safe alphabet (`-`, `_`) is rejected; callers
//! treat a [`base64::DecodeError`] as "not valid base64 here".

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::Engine as _;
use std::borrow::Cow;
use tracing::debug;

/// Standard alphabet, padding required, trailing bits ignored.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Encode bytes as standard, padded base64.
pub fn encode(data: &[u8]) -> String {
    let b64 = STANDARD.encode(data);
    debug!("Encoded {} bytes → {} bytes base64", data.len(), b64.len());
    b64
}

/// Decode standard base64, ignoring CR/LF.
pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    LENIENT_STANDARD.decode(strip_line_breaks(text).as_bytes())
}

/// Remove CR and LF, borrowing when there are none.
pub(crate) fn strip_line_breaks(text: &str) -> Cow<'_, str> {
    if text.contains(['\r', '\n']) {
        Cow::Owned(text.replace(['\r', '\n'], ""))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_uses_standard_alphabet() {
        assert_eq!(encode(&[0xFB, 0xFF]), "+/8=");
        assert_eq!(encode(b""), "");
    }

    #[test]
    fn decode_round_trips() {
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&data)).unwrap(), data);
    }

    #[test]
    fn decode_rejects_url_safe_alphabet() {
        assert!(decode("-_8=").is_err());
        assert_eq!(decode("+/8=").unwrap(), vec![0xFB, 0xFF]);
    }

    #[test]
    fn decode_requires_padding() {
        assert!(decode("AAA").is_err());
        assert_eq!(decode("AAA=").unwrap(), vec![0, 0]);
    }

    #[test]
    fn decode_skips_line_breaks() {
        assert_eq!(decode("AA\r\nA=\n").unwrap(), vec![0, 0]);
    }

    #[test]
    fn decode_tolerates_trailing_bits() {
        // "AAB=" has non-zero bits past the last full byte
        assert_eq!(decode("AAB=").unwrap(), vec![0, 0]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("not base64!").is_err());
        assert!(decode("AAAA BBBB").is_err());
    }
}
