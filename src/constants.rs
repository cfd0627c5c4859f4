//! Application-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Protocol limits
// =============================================================================

/// Maximum data length of a raw frame (classic CAN)
pub const MAX_FRAME_DATA: usize = 8;

/// Maximum payload length of a diagnostic request or response
pub const MAX_DIAGNOSTIC_PAYLOAD: usize = 64;

/// Largest magnitude rendered as a JSON integer (2^53, exact in f64)
pub const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

// =============================================================================
// Buffers
// =============================================================================

/// Default encode buffer capacity for the tool
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Default upper bound for a single incoming message
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4096;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "vjson.toml";
