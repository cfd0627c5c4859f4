//! JSON payload → `VehicleMessage`
//!
//! The payload is parsed once into a JSON object, then classified by which
//! keys it carries. Priority, highest first:
//!
//! 1. `command_response` → command response
//! 2. `command` → control command
//! 3. `mode` / `pid` / `success` / `negative_response_code` → diagnostic
//!    (`success` makes it a response)
//! 4. `id` / `data` → raw frame
//! 5. `name` → simple signal
//!
//! An object with `name` next to any raw frame key is rejected before the
//! diagnostic check, as is one with both command keys. `name` is only read
//! from the nested `request` of a `diagnostic` command.

use serde_json::{Map, Value};

use super::fields::*;
use super::hex_string;
use crate::error::DecodeError;
use crate::message::{
    CommandName, CommandResponse, ControlCommand, DiagnosticAction, DiagnosticRequest,
    DiagnosticResponse, Payload, RawMessage, SignalValue, SimpleMessage, VehicleMessage,
};

type Result<T> = std::result::Result<T, DecodeError>;

/// Decode one JSON object into a message
///
/// Reads nothing outside `payload`. Trailing non-whitespace after the
/// object is malformed input.
pub fn decode(payload: &[u8]) -> Result<VehicleMessage> {
    let root: Value = serde_json::from_slice(payload).map_err(|_| DecodeError::MalformedJson)?;
    let Value::Object(object) = root else {
        return Err(DecodeError::MalformedJson);
    };
    decode_object(Fields(&object))
}

fn decode_object(fields: Fields<'_>) -> Result<VehicleMessage> {
    let has_command = fields.has(COMMAND_FIELD_NAME);
    let has_command_response = fields.has(COMMAND_RESPONSE_FIELD_NAME);

    if has_command && has_command_response {
        return Err(DecodeError::IncompleteMessage);
    }
    if has_command_response {
        return decode_command_response(fields).map(VehicleMessage::CommandResponse);
    }
    if has_command {
        return decode_command(fields).map(VehicleMessage::Command);
    }

    let has_name = fields.has(NAME_FIELD_NAME);
    let has_raw_key = RAW_FIELDS.iter().any(|key| fields.has(key));
    if has_name && has_raw_key {
        return Err(DecodeError::IncompleteMessage);
    }

    if DIAGNOSTIC_MARKER_FIELDS.iter().any(|key| fields.has(key)) {
        return if fields.has(DIAGNOSTIC_SUCCESS_FIELD_NAME) {
            decode_diagnostic_response(fields).map(VehicleMessage::DiagnosticResponse)
        } else {
            decode_diagnostic_request(fields).map(VehicleMessage::DiagnosticRequest)
        };
    }

    match (has_name, has_raw_key) {
        (true, false) => decode_simple(fields).map(VehicleMessage::Simple),
        (false, true) if fields.has(ID_FIELD_NAME) || fields.has(DATA_FIELD_NAME) => {
            decode_raw(fields).map(VehicleMessage::Raw)
        }
        _ => Err(DecodeError::IncompleteMessage),
    }
}

// =============================================================================
// Per-kind field mapping
// =============================================================================

fn decode_simple(fields: Fields<'_>) -> Result<SimpleMessage> {
    Ok(SimpleMessage {
        name: fields.require(NAME_FIELD_NAME, string)?,
        value: fields.require(VALUE_FIELD_NAME, signal_value)?,
        event: fields.optional(EVENT_FIELD_NAME, signal_value)?,
    })
}

fn decode_raw(fields: Fields<'_>) -> Result<RawMessage> {
    Ok(RawMessage {
        bus: fields.require(BUS_FIELD_NAME, unsigned)?,
        id: fields.require(ID_FIELD_NAME, unsigned)?,
        data: fields.require(DATA_FIELD_NAME, hex_payload)?,
    })
}

fn decode_diagnostic_request(fields: Fields<'_>) -> Result<DiagnosticRequest> {
    // Response-only keys on a request
    if fields.has(DIAGNOSTIC_NRC_FIELD_NAME) || fields.has(DIAGNOSTIC_SUCCESS_FIELD_NAME) {
        return Err(DecodeError::IncompleteMessage);
    }

    Ok(DiagnosticRequest {
        bus: fields.require(BUS_FIELD_NAME, unsigned)?,
        id: fields.require(ID_FIELD_NAME, unsigned)?,
        mode: fields.require(DIAGNOSTIC_MODE_FIELD_NAME, unsigned)?,
        pid: fields.optional(DIAGNOSTIC_PID_FIELD_NAME, unsigned)?,
        payload: fields.optional(DIAGNOSTIC_PAYLOAD_FIELD_NAME, hex_payload)?,
        multiple_responses: fields.optional(DIAGNOSTIC_MULTIPLE_RESPONSES_FIELD_NAME, boolean)?,
        frequency: fields.optional(DIAGNOSTIC_FREQUENCY_FIELD_NAME, number)?,
        name: fields.optional(DIAGNOSTIC_NAME_FIELD_NAME, string)?,
    })
}

fn decode_diagnostic_response(fields: Fields<'_>) -> Result<DiagnosticResponse> {
    Ok(DiagnosticResponse {
        bus: fields.require(BUS_FIELD_NAME, unsigned)?,
        id: fields.require(ID_FIELD_NAME, unsigned)?,
        mode: fields.require(DIAGNOSTIC_MODE_FIELD_NAME, unsigned)?,
        pid: fields.optional(DIAGNOSTIC_PID_FIELD_NAME, unsigned)?,
        success: fields.require(DIAGNOSTIC_SUCCESS_FIELD_NAME, boolean)?,
        negative_response_code: fields.optional(DIAGNOSTIC_NRC_FIELD_NAME, unsigned)?,
        payload: fields.optional(DIAGNOSTIC_PAYLOAD_FIELD_NAME, hex_payload)?,
        value: fields.optional(DIAGNOSTIC_VALUE_FIELD_NAME, number)?,
    })
}

fn decode_command_response(fields: Fields<'_>) -> Result<CommandResponse> {
    Ok(CommandResponse {
        command: fields.require(COMMAND_RESPONSE_FIELD_NAME, command_name)?,
        message: fields.optional(COMMAND_RESPONSE_MESSAGE_FIELD_NAME, string)?,
        status: fields.require(COMMAND_RESPONSE_STATUS_FIELD_NAME, boolean)?,
    })
}

fn decode_command(fields: Fields<'_>) -> Result<ControlCommand> {
    match fields.require(COMMAND_FIELD_NAME, command_name)? {
        CommandName::Version => Ok(ControlCommand::Version),
        CommandName::DeviceId => Ok(ControlCommand::DeviceId),
        CommandName::Diagnostic => {
            let action = fields.require(DIAGNOSTIC_ACTION_FIELD_NAME, diagnostic_action)?;
            let request = fields.require(DIAGNOSTIC_REQUEST_FIELD_NAME, object)?;
            Ok(ControlCommand::Diagnostic {
                action,
                request: decode_diagnostic_request(Fields(request))?,
            })
        }
        CommandName::Passthrough => Ok(ControlCommand::Passthrough {
            bus: fields.require(BUS_FIELD_NAME, unsigned)?,
            enabled: fields.require(PASSTHROUGH_ENABLED_FIELD_NAME, boolean)?,
        }),
    }
}

// =============================================================================
// Field access
// =============================================================================

/// Borrowed view of a JSON object's members
#[derive(Clone, Copy)]
struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
    fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Extract a key that must be present
    fn require<T>(
        &self,
        key: &'static str,
        extract: impl FnOnce(&'static str, &'a Value) -> Result<T>,
    ) -> Result<T> {
        match self.0.get(key) {
            Some(value) => extract(key, value),
            None => Err(DecodeError::IncompleteMessage),
        }
    }

    /// Extract a key that may be absent; `null` is not absence
    fn optional<T>(
        &self,
        key: &'static str,
        extract: impl FnOnce(&'static str, &'a Value) -> Result<T>,
    ) -> Result<Option<T>> {
        self.0.get(key).map(|value| extract(key, value)).transpose()
    }
}

// =============================================================================
// Typed extractors
// =============================================================================

fn string(field: &'static str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        _ => Err(DecodeError::TypeMismatch { field }),
    }
}

fn boolean(field: &'static str, value: &Value) -> Result<bool> {
    value.as_bool().ok_or(DecodeError::TypeMismatch { field })
}

fn number(field: &'static str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(DecodeError::TypeMismatch { field }),
        _ => Err(DecodeError::TypeMismatch { field }),
    }
}

/// Non-negative integer that fits `T`
///
/// Accepts `12` and `12.0`; rejects `12.5`, `-1` and out-of-range values.
fn unsigned<T: TryFrom<u64>>(field: &'static str, value: &Value) -> Result<T> {
    let Value::Number(n) = value else {
        return Err(DecodeError::TypeMismatch { field });
    };

    let raw = n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    });

    raw.and_then(|raw| T::try_from(raw).ok())
        .ok_or(DecodeError::TypeMismatch { field })
}

fn signal_value(field: &'static str, value: &Value) -> Result<SignalValue> {
    match value {
        Value::Number(_) => number(field, value).map(SignalValue::Number),
        Value::String(text) => Ok(SignalValue::Text(text.clone())),
        Value::Bool(flag) => Ok(SignalValue::Bool(*flag)),
        _ => Err(DecodeError::TypeMismatch { field }),
    }
}

fn hex_payload<const N: usize>(field: &'static str, value: &Value) -> Result<Payload<N>> {
    match value {
        Value::String(text) => hex_string::decode(field, text),
        _ => Err(DecodeError::TypeMismatch { field }),
    }
}

fn command_name(field: &'static str, value: &Value) -> Result<CommandName> {
    match value {
        Value::String(name) => {
            CommandName::from_wire(name).ok_or_else(|| DecodeError::UnknownCommand(name.clone()))
        }
        _ => Err(DecodeError::TypeMismatch { field }),
    }
}

fn diagnostic_action(field: &'static str, value: &Value) -> Result<DiagnosticAction> {
    match value {
        Value::String(action) => {
            DiagnosticAction::from_wire(action).ok_or(DecodeError::TypeMismatch { field })
        }
        _ => Err(DecodeError::TypeMismatch { field }),
    }
}

fn object<'a>(field: &'static str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or(DecodeError::TypeMismatch { field })
}
