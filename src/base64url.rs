use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::{DecodeError, Engine};

use crate::error::PushError;

/// URL-safe decoder that ignores non-zero trailing bits, like a browser's `atob`.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Base64url encode bytes without padding.
///
/// Encode a sub-range by slicing: `base64url_encode(&bytes[1..33])`.
pub fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Base64url decode a string to bytes.
///
/// Padding is optional, but when present it must bring the input to a
/// multiple of 4 characters. Characters outside the URL-safe alphabet
/// (including `+` and `/`) are rejected.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, PushError> {
    let unpadded = s.trim_end_matches('=');
    let padding = s.len() - unpadded.len();
    if padding > 0 && (padding > 2 || s.len() % 4 != 0) {
        return Err(DecodeError::InvalidPadding.into());
    }
    Ok(LENIENT_URL_SAFE.decode(unpadded)?)
}
