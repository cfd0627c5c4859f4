//! Hex string representation of byte-sequence fields
//!
//! Wire format: an even number of hex digits, either case, optionally
//! prefixed by `0x`. Example: `"DEADBEEF"`, `"0x01ff"`.

use crate::error::DecodeError;
use crate::message::Payload;

/// Output style for encoded hex strings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexStyle {
    pub prefix: bool,
    pub uppercase: bool,
}

/// Decode a hex string into an inline payload of capacity `N`
///
/// Fails with `InvalidHexPayload` on odd length, a non-hex digit, or more
/// than `N` bytes.
pub fn decode<const N: usize>(
    field: &'static str,
    text: &str,
) -> Result<Payload<N>, DecodeError> {
    let invalid = DecodeError::InvalidHexPayload { field };
    let digits = strip_prefix(text).as_bytes();

    if digits.len() % 2 != 0 {
        return Err(invalid);
    }

    match Payload::fill_with(digits.len() / 2, |out| hex::decode_to_slice(digits, out)) {
        Some(Ok(payload)) => Ok(payload),
        Some(Err(_)) | None => Err(invalid),
    }
}

fn strip_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

/// Render `bytes` into `out` and return the used prefix as a string
///
/// `out` must hold at least `2 + 2 * bytes.len()` bytes.
pub fn encode_to_slice<'a>(bytes: &[u8], style: HexStyle, out: &'a mut [u8]) -> Option<&'a str> {
    let offset = if style.prefix { 2 } else { 0 };
    let end = offset + bytes.len() * 2;
    if out.len() < end {
        return None;
    }

    if style.prefix {
        out[..2].copy_from_slice(b"0x");
    }
    hex::encode_to_slice(bytes, &mut out[offset..end]).ok()?;
    if style.uppercase {
        out[offset..end].make_ascii_uppercase();
    }

    std::str::from_utf8(&out[..end]).ok()
}
