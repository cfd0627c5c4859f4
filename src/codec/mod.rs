//! Codec abstraction for vehicle message encoding/decoding
//!
//! Separates payload format from transport:
//! - **Codec**: how a `VehicleMessage` maps to payload bytes (JSON here)
//! - **Transport**: how payload bytes flow (not handled by this crate)
//!
//! Calls are independent: no codec state survives between messages, so a
//! failed decode never affects the next one.

mod decoder;
mod encoder;
pub mod fields;
mod hex_string;

pub use hex_string::HexStyle;

use crate::error::{DecodeError, EncodeError};
use crate::message::VehicleMessage;
use serde::{Deserialize, Serialize};

/// Codec trait for payload encoding/decoding
///
/// A codec turns one payload into one message (decode) and one message
/// into one payload written to a caller-owned buffer (encode).
pub trait Codec: Send + Sync {
    /// Decode a complete payload
    fn decode(&self, payload: &[u8]) -> Result<VehicleMessage, DecodeError>;

    /// Encode a message into `buffer`, returning the bytes written
    fn encode(&self, message: &VehicleMessage, buffer: &mut [u8]) -> Result<usize, EncodeError>;
}

/// Output formatting knobs for the JSON codec
///
/// Decoding accepts every combination regardless of these settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Write byte sequences as `"0x..."`
    pub hex_prefix: bool,
    /// Write hex digits in uppercase
    pub uppercase_hex: bool,
}

impl CodecOptions {
    fn hex_style(self) -> HexStyle {
        HexStyle {
            prefix: self.hex_prefix,
            uppercase: self.uppercase_hex,
        }
    }
}

/// JSON payload codec
///
/// # Example
///
/// ```ignore
/// let codec = JsonCodec::default();
/// let message = codec.decode(br#"{"name":"engine_speed","value":1250}"#)?;
///
/// let mut buffer = [0u8; 128];
/// let written = codec.encode(&message, &mut buffer)?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    options: CodecOptions,
}

impl JsonCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }
}

impl Codec for JsonCodec {
    fn decode(&self, payload: &[u8]) -> Result<VehicleMessage, DecodeError> {
        decoder::decode(payload)
    }

    fn encode(&self, message: &VehicleMessage, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        encoder::encode(message, self.options.hex_style(), buffer)
    }
}

/// Decode a JSON payload into a message
pub fn decode(payload: &[u8]) -> Result<VehicleMessage, DecodeError> {
    decoder::decode(payload)
}

/// Encode a message with default options
///
/// Returns the number of bytes written, or 0 if the message did not fit or
/// could not be represented. Use [`try_encode`] to learn why.
pub fn encode(message: &VehicleMessage, buffer: &mut [u8]) -> usize {
    try_encode(message, buffer).unwrap_or(0)
}

/// Encode a message with default options, reporting the failure reason
pub fn try_encode(message: &VehicleMessage, buffer: &mut [u8]) -> Result<usize, EncodeError> {
    encoder::encode(message, HexStyle::default(), buffer)
}
