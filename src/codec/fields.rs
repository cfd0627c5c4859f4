//! Wire vocabulary shared by the decoder and encoder
//!
//! Every JSON key and command name on the wire comes from here. Changing
//! one of these strings breaks compatibility with deployed devices.

// =============================================================================
// Command names
// =============================================================================

pub const VERSION_COMMAND_NAME: &str = "version";
pub const DEVICE_ID_COMMAND_NAME: &str = "device_id";
pub const DIAGNOSTIC_COMMAND_NAME: &str = "diagnostic";
pub const PASSTHROUGH_COMMAND_NAME: &str = "passthrough";

// =============================================================================
// Command requests and responses
// =============================================================================

pub const COMMAND_FIELD_NAME: &str = "command";
pub const COMMAND_RESPONSE_FIELD_NAME: &str = "command_response";
pub const COMMAND_RESPONSE_MESSAGE_FIELD_NAME: &str = "message";
pub const COMMAND_RESPONSE_STATUS_FIELD_NAME: &str = "status";

pub const DIAGNOSTIC_ACTION_FIELD_NAME: &str = "action";
pub const DIAGNOSTIC_REQUEST_FIELD_NAME: &str = "request";
pub const DIAGNOSTIC_ADD_ACTION: &str = "add";
pub const DIAGNOSTIC_CANCEL_ACTION: &str = "cancel";

pub const PASSTHROUGH_ENABLED_FIELD_NAME: &str = "enabled";

// =============================================================================
// Signals and frames
// =============================================================================

pub const BUS_FIELD_NAME: &str = "bus";
pub const ID_FIELD_NAME: &str = "id";
pub const DATA_FIELD_NAME: &str = "data";
pub const NAME_FIELD_NAME: &str = "name";
pub const VALUE_FIELD_NAME: &str = "value";
pub const EVENT_FIELD_NAME: &str = "event";

// =============================================================================
// Diagnostics
// =============================================================================

pub const DIAGNOSTIC_MODE_FIELD_NAME: &str = "mode";
pub const DIAGNOSTIC_PID_FIELD_NAME: &str = "pid";
pub const DIAGNOSTIC_SUCCESS_FIELD_NAME: &str = "success";
pub const DIAGNOSTIC_NRC_FIELD_NAME: &str = "negative_response_code";
pub const DIAGNOSTIC_PAYLOAD_FIELD_NAME: &str = "payload";
pub const DIAGNOSTIC_VALUE_FIELD_NAME: &str = "value";
pub const DIAGNOSTIC_MULTIPLE_RESPONSES_FIELD_NAME: &str = "multiple_responses";
pub const DIAGNOSTIC_FREQUENCY_FIELD_NAME: &str = "frequency";
pub const DIAGNOSTIC_NAME_FIELD_NAME: &str = "name";

/// Keys whose presence marks an object as a diagnostic message
pub const DIAGNOSTIC_MARKER_FIELDS: [&str; 4] = [
    DIAGNOSTIC_MODE_FIELD_NAME,
    DIAGNOSTIC_PID_FIELD_NAME,
    DIAGNOSTIC_SUCCESS_FIELD_NAME,
    DIAGNOSTIC_NRC_FIELD_NAME,
];

/// Keys that belong to a raw frame
pub const RAW_FIELDS: [&str; 3] = [BUS_FIELD_NAME, ID_FIELD_NAME, DATA_FIELD_NAME];
