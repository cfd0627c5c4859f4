//! Centralized error types
//!
//! - `DecodeError` / `EncodeError` are returned by the codec to its caller.
//! - `ToolError` covers the `vjson` binary (config, I/O).
//!
//! Use `Result<T>` as shorthand for `std::result::Result<T, ToolError>`.

use std::path::PathBuf;
use thiserror::Error;

/// Why a payload could not be decoded into a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not valid JSON, or valid JSON that is not an object
    #[error("malformed JSON payload")]
    MalformedJson,
    /// A recognized key held a value of the wrong JSON type or range
    #[error("field '{field}' has the wrong type")]
    TypeMismatch { field: &'static str },
    /// A byte-sequence field is not valid hex or is too long
    #[error("field '{field}' is not a valid hex payload")]
    InvalidHexPayload { field: &'static str },
    /// Command name outside the known vocabulary
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    /// Key set matches no message kind, or more than one
    #[error("incomplete or ambiguous message")]
    IncompleteMessage,
}

impl DecodeError {
    /// Stable short name, used for per-kind counters
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::MalformedJson => "malformed_json",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::InvalidHexPayload { .. } => "invalid_hex_payload",
            Self::UnknownCommand(_) => "unknown_command",
            Self::IncompleteMessage => "incomplete_message",
        }
    }
}

/// Why a message could not be encoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Serialized message does not fit in the output buffer
    #[error("buffer too small ({capacity} bytes)")]
    BufferTooSmall { capacity: usize },
    /// NaN or infinity cannot be represented in JSON
    #[error("field '{field}' is not a finite number")]
    NonFiniteNumber { field: &'static str },
    /// Would not decode back as the same message, or the serializer
    /// refused it
    #[error("message cannot be represented as JSON")]
    Unrepresentable,
}

impl EncodeError {
    /// Short machine-readable name, used as a statistics key
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::BufferTooSmall { .. } => "buffer_too_small",
            Self::NonFiniteNumber { .. } => "non_finite_number",
            Self::Unrepresentable => "unrepresentable",
        }
    }
}

/// Errors raised by the `vjson` tool
#[derive(Debug, Error)]
pub enum ToolError {
    /// Failed to read input or write output
    #[error("IO error: {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Invalid config value
    #[error("Invalid {field}: {reason}")]
    ConfigValidation { field: &'static str, reason: String },
    /// Message larger than the configured maximum
    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Alias for Result with ToolError
pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::TypeMismatch { field: "bus" };
        assert_eq!(err.to_string(), "field 'bus' has the wrong type");

        let err = DecodeError::UnknownCommand("reboot".into());
        assert_eq!(err.to_string(), "unknown command 'reboot'");
    }

    #[test]
    fn test_decode_error_kind_str() {
        assert_eq!(DecodeError::MalformedJson.kind_str(), "malformed_json");
        assert_eq!(
            DecodeError::InvalidHexPayload { field: "data" }.kind_str(),
            "invalid_hex_payload"
        );
    }

    #[test]
    fn test_encode_error_kind_str() {
        assert_eq!(
            EncodeError::BufferTooSmall { capacity: 8 }.kind_str(),
            "buffer_too_small"
        );
        assert_eq!(EncodeError::Unrepresentable.kind_str(), "unrepresentable");
    }

    #[test]
    fn test_tool_error_source() {
        use std::error::Error as _;

        let err = ToolError::Io {
            path: PathBuf::from("input.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "IO error: input.json");
        assert!(err.source().is_some());
    }
}
