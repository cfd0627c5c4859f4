//! `VehicleMessage` → JSON bytes in a caller-owned buffer
//!
//! Keys come out in a fixed order per message kind, absent optional fields
//! are omitted, and byte sequences are written as hex strings. Either the
//! whole object fits in the buffer or nothing usable is left in it.

use std::io::{self, Write as _};

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use super::fields::*;
use super::hex_string::{self, HexStyle};
use crate::constants::{MAX_DIAGNOSTIC_PAYLOAD, MAX_EXACT_INTEGER};
use crate::error::EncodeError;
use crate::message::{ControlCommand, DiagnosticRequest, SignalValue, VehicleMessage};

/// Serialize `message` into `buffer`
///
/// Returns the number of bytes written. On error the bytes written so far
/// are zeroed.
pub fn encode(
    message: &VehicleMessage,
    style: HexStyle,
    buffer: &mut [u8],
) -> Result<usize, EncodeError> {
    check_finite(message)?;
    // `name` next to `bus`/`id` does not decode as a top-level request
    if let VehicleMessage::DiagnosticRequest(request) = message {
        if request.name.is_some() {
            return Err(EncodeError::Unrepresentable);
        }
    }

    let capacity = buffer.len();
    let mut writer = SliceWriter::new(buffer);

    match serde_json::to_writer(&mut writer, &MessageView { message, style }) {
        Ok(()) => Ok(writer.position()),
        Err(err) => {
            writer.scrub();
            if err.is_io() {
                Err(EncodeError::BufferTooSmall { capacity })
            } else {
                Err(EncodeError::Unrepresentable)
            }
        }
    }
}

/// Reject NaN and infinities before anything is written
fn check_finite(message: &VehicleMessage) -> Result<(), EncodeError> {
    fn finite(field: &'static str, value: Option<f64>) -> Result<(), EncodeError> {
        match value {
            Some(v) if !v.is_finite() => Err(EncodeError::NonFiniteNumber { field }),
            _ => Ok(()),
        }
    }

    fn signal(value: &SignalValue) -> Option<f64> {
        match value {
            SignalValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    match message {
        VehicleMessage::Simple(simple) => {
            finite(VALUE_FIELD_NAME, signal(&simple.value))?;
            finite(EVENT_FIELD_NAME, simple.event.as_ref().and_then(signal))
        }
        VehicleMessage::DiagnosticRequest(request) => {
            finite(DIAGNOSTIC_FREQUENCY_FIELD_NAME, request.frequency)
        }
        VehicleMessage::DiagnosticResponse(response) => {
            finite(DIAGNOSTIC_VALUE_FIELD_NAME, response.value)
        }
        VehicleMessage::Command(ControlCommand::Diagnostic { request, .. }) => {
            finite(DIAGNOSTIC_FREQUENCY_FIELD_NAME, request.frequency)
        }
        VehicleMessage::Raw(_) | VehicleMessage::CommandResponse(_) | VehicleMessage::Command(_) => {
            Ok(())
        }
    }
}

// =============================================================================
// Bounded writer
// =============================================================================

/// `io::Write` over a fixed slice
///
/// A write that does not fit is refused whole, so the slice never holds a
/// partial token.
struct SliceWriter<'a> {
    buffer: &'a mut [u8],
    position: usize,
}

impl<'a> SliceWriter<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    fn position(&self) -> usize {
        self.position
    }

    /// Zero everything written so far
    fn scrub(&mut self) {
        self.buffer[..self.position].fill(0);
        self.position = 0;
    }
}

impl io::Write for SliceWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let end = self.position + data.len();
        if end > self.buffer.len() {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "output buffer full"));
        }
        self.buffer[self.position..end].copy_from_slice(data);
        self.position = end;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Wire views
// =============================================================================

struct MessageView<'a> {
    message: &'a VehicleMessage,
    style: HexStyle,
}

impl Serialize for MessageView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let style = self.style;
        let mut map = serializer.serialize_map(None)?;

        match self.message {
            VehicleMessage::Simple(simple) => {
                map.serialize_entry(NAME_FIELD_NAME, &simple.name)?;
                map.serialize_entry(VALUE_FIELD_NAME, &SignalView(&simple.value))?;
                if let Some(event) = &simple.event {
                    map.serialize_entry(EVENT_FIELD_NAME, &SignalView(event))?;
                }
            }
            VehicleMessage::Raw(raw) => {
                map.serialize_entry(BUS_FIELD_NAME, &raw.bus)?;
                map.serialize_entry(ID_FIELD_NAME, &raw.id)?;
                map.serialize_entry(DATA_FIELD_NAME, &HexView(raw.data.as_slice(), style))?;
            }
            VehicleMessage::DiagnosticRequest(request) => {
                write_request(&mut map, request, style)?;
            }
            VehicleMessage::DiagnosticResponse(response) => {
                map.serialize_entry(BUS_FIELD_NAME, &response.bus)?;
                map.serialize_entry(ID_FIELD_NAME, &response.id)?;
                map.serialize_entry(DIAGNOSTIC_MODE_FIELD_NAME, &response.mode)?;
                if let Some(pid) = response.pid {
                    map.serialize_entry(DIAGNOSTIC_PID_FIELD_NAME, &pid)?;
                }
                map.serialize_entry(DIAGNOSTIC_SUCCESS_FIELD_NAME, &response.success)?;
                if let Some(nrc) = response.negative_response_code {
                    map.serialize_entry(DIAGNOSTIC_NRC_FIELD_NAME, &nrc)?;
                }
                if let Some(payload) = &response.payload {
                    map.serialize_entry(
                        DIAGNOSTIC_PAYLOAD_FIELD_NAME,
                        &HexView(payload.as_slice(), style),
                    )?;
                }
                if let Some(value) = response.value {
                    map.serialize_entry(DIAGNOSTIC_VALUE_FIELD_NAME, &NumberView(value))?;
                }
            }
            VehicleMessage::CommandResponse(response) => {
                map.serialize_entry(COMMAND_RESPONSE_FIELD_NAME, response.command.as_str())?;
                if let Some(message) = &response.message {
                    map.serialize_entry(COMMAND_RESPONSE_MESSAGE_FIELD_NAME, message)?;
                }
                map.serialize_entry(COMMAND_RESPONSE_STATUS_FIELD_NAME, &response.status)?;
            }
            VehicleMessage::Command(command) => {
                map.serialize_entry(COMMAND_FIELD_NAME, command.name().as_str())?;
                match command {
                    ControlCommand::Version | ControlCommand::DeviceId => {}
                    ControlCommand::Diagnostic { action, request } => {
                        map.serialize_entry(DIAGNOSTIC_ACTION_FIELD_NAME, action.as_str())?;
                        map.serialize_entry(
                            DIAGNOSTIC_REQUEST_FIELD_NAME,
                            &RequestView(request, style),
                        )?;
                    }
                    ControlCommand::Passthrough { bus, enabled } => {
                        map.serialize_entry(BUS_FIELD_NAME, bus)?;
                        map.serialize_entry(PASSTHROUGH_ENABLED_FIELD_NAME, enabled)?;
                    }
                }
            }
        }

        map.end()
    }
}

/// Diagnostic request fields, shared by the top-level request and the
/// `diagnostic` command
fn write_request<M: SerializeMap>(
    map: &mut M,
    request: &DiagnosticRequest,
    style: HexStyle,
) -> Result<(), M::Error> {
    map.serialize_entry(BUS_FIELD_NAME, &request.bus)?;
    map.serialize_entry(ID_FIELD_NAME, &request.id)?;
    map.serialize_entry(DIAGNOSTIC_MODE_FIELD_NAME, &request.mode)?;
    if let Some(pid) = request.pid {
        map.serialize_entry(DIAGNOSTIC_PID_FIELD_NAME, &pid)?;
    }
    if let Some(payload) = &request.payload {
        map.serialize_entry(
            DIAGNOSTIC_PAYLOAD_FIELD_NAME,
            &HexView(payload.as_slice(), style),
        )?;
    }
    if let Some(multiple) = request.multiple_responses {
        map.serialize_entry(DIAGNOSTIC_MULTIPLE_RESPONSES_FIELD_NAME, &multiple)?;
    }
    if let Some(frequency) = request.frequency {
        map.serialize_entry(DIAGNOSTIC_FREQUENCY_FIELD_NAME, &NumberView(frequency))?;
    }
    if let Some(name) = &request.name {
        map.serialize_entry(DIAGNOSTIC_NAME_FIELD_NAME, name)?;
    }
    Ok(())
}

struct RequestView<'a>(&'a DiagnosticRequest, HexStyle);

impl Serialize for RequestView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        write_request(&mut map, self.0, self.1)?;
        map.end()
    }
}

struct SignalView<'a>(&'a SignalValue);

impl Serialize for SignalView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            SignalValue::Number(value) => NumberView(*value).serialize(serializer),
            SignalValue::Text(text) => serializer.serialize_str(text),
            SignalValue::Bool(flag) => serializer.serialize_bool(*flag),
        }
    }
}

/// Room for the longest `Display` form of a finite f64
const DECIMAL_SCRATCH: usize = 344;

/// Whole numbers are written without a fractional part, everything else
/// in plain decimal with no exponent
struct NumberView(f64);

impl Serialize for NumberView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if !value.is_finite() {
            return Err(S::Error::custom("non-finite number"));
        }
        if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
            return serializer.serialize_i64(value as i64);
        }

        // `Display` keeps the shortest round-trip digits and never uses an exponent
        let mut scratch = [0u8; DECIMAL_SCRATCH];
        let mut writer = SliceWriter::new(&mut scratch);
        write!(writer, "{}", value).map_err(S::Error::custom)?;
        let len = writer.position();

        let text = std::str::from_utf8(&scratch[..len]).map_err(S::Error::custom)?;
        let raw: &RawValue = serde_json::from_str(text).map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }
}

struct HexView<'a>(&'a [u8], HexStyle);

impl Serialize for HexView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut scratch = [0u8; 2 + 2 * MAX_DIAGNOSTIC_PAYLOAD];
        match hex_string::encode_to_slice(self.0, self.1, &mut scratch) {
            Some(text) => serializer.serialize_str(text),
            None => Err(S::Error::custom("byte sequence too long")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{
        CommandName, CommandResponse, DiagnosticAction, DiagnosticResponse, Payload, RawMessage,
        SimpleMessage,
    };

    fn encode_string(message: &VehicleMessage) -> String {
        let mut buffer = [0u8; 512];
        let written = encode(message, HexStyle::default(), &mut buffer).unwrap();
        String::from_utf8(buffer[..written].to_vec()).unwrap()
    }

    #[test]
    fn test_encode_simple_integer() {
        let message = VehicleMessage::simple("engine_speed", 1250);
        assert_eq!(
            encode_string(&message),
            r#"{"name":"engine_speed","value":1250}"#
        );
    }

    #[test]
    fn test_encode_simple_fraction_and_event() {
        let message = VehicleMessage::Simple(SimpleMessage {
            name: "door_status".into(),
            value: SignalValue::Number(42.5),
            event: Some(SignalValue::Bool(false)),
        });
        assert_eq!(
            encode_string(&message),
            r#"{"name":"door_status","value":42.5,"event":false}"#
        );
    }

    #[test]
    fn test_encode_simple_text_escaped() {
        let message = VehicleMessage::simple("gear", "fi\"rst");
        assert_eq!(
            encode_string(&message),
            r#"{"name":"gear","value":"fi\"rst"}"#
        );
    }

    #[test]
    fn test_encode_raw() {
        let message = VehicleMessage::Raw(RawMessage {
            bus: 1,
            id: 1234,
            data: Payload::from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap(),
        });
        assert_eq!(
            encode_string(&message),
            r#"{"bus":1,"id":1234,"data":"deadbeef"}"#
        );
    }

    #[test]
    fn test_encode_raw_prefixed_uppercase() {
        let message = VehicleMessage::Raw(RawMessage {
            bus: 2,
            id: 7,
            data: Payload::from_slice(&[0x0A]).unwrap(),
        });
        let style = HexStyle {
            prefix: true,
            uppercase: true,
        };
        let mut buffer = [0u8; 64];
        let written = encode(&message, style, &mut buffer).unwrap();
        assert_eq!(&buffer[..written], br#"{"bus":2,"id":7,"data":"0x0A"}"#);
    }

    #[test]
    fn test_encode_diagnostic_response_omits_absent() {
        let message = VehicleMessage::DiagnosticResponse(DiagnosticResponse {
            bus: 1,
            id: 1234,
            mode: 9,
            pid: Some(2),
            success: true,
            negative_response_code: None,
            payload: None,
            value: Some(42.0),
        });
        assert_eq!(
            encode_string(&message),
            r#"{"bus":1,"id":1234,"mode":9,"pid":2,"success":true,"value":42}"#
        );
    }

    #[test]
    fn test_encode_diagnostic_request_key_order() {
        let message = VehicleMessage::DiagnosticRequest(DiagnosticRequest {
            bus: 1,
            id: 2015,
            mode: 1,
            pid: Some(12),
            payload: Some(Payload::from_slice(&[0x01]).unwrap()),
            multiple_responses: Some(false),
            frequency: Some(0.5),
            name: None,
        });
        assert_eq!(
            encode_string(&message),
            r#"{"bus":1,"id":2015,"mode":1,"pid":12,"payload":"01","multiple_responses":false,"frequency":0.5}"#
        );
    }

    #[test]
    fn test_encode_top_level_request_with_name_rejected() {
        let message = VehicleMessage::DiagnosticRequest(DiagnosticRequest {
            bus: 1,
            id: 1234,
            mode: 1,
            name: Some("engine_speed".into()),
            ..Default::default()
        });
        let mut buffer = [0u8; 128];
        assert_eq!(
            encode(&message, HexStyle::default(), &mut buffer),
            Err(EncodeError::Unrepresentable)
        );
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_diagnostic_command_keeps_name() {
        let message = VehicleMessage::Command(ControlCommand::Diagnostic {
            action: DiagnosticAction::Add,
            request: DiagnosticRequest {
                bus: 1,
                id: 1234,
                mode: 1,
                name: Some("engine_speed".into()),
                ..Default::default()
            },
        });
        assert_eq!(
            encode_string(&message),
            r#"{"command":"diagnostic","action":"add","request":{"bus":1,"id":1234,"mode":1,"name":"engine_speed"}}"#
        );
    }

    #[test]
    fn test_encode_command_response() {
        let message = VehicleMessage::CommandResponse(CommandResponse {
            command: CommandName::Version,
            message: Some("6.0-dev".into()),
            status: true,
        });
        assert_eq!(
            encode_string(&message),
            r#"{"command_response":"version","message":"6.0-dev","status":true}"#
        );
    }

    #[test]
    fn test_encode_commands() {
        assert_eq!(
            encode_string(&VehicleMessage::Command(ControlCommand::DeviceId)),
            r#"{"command":"device_id"}"#
        );
        assert_eq!(
            encode_string(&VehicleMessage::Command(ControlCommand::Passthrough {
                bus: 1,
                enabled: false
            })),
            r#"{"command":"passthrough","bus":1,"enabled":false}"#
        );

        let diagnostic = VehicleMessage::Command(ControlCommand::Diagnostic {
            action: DiagnosticAction::Cancel,
            request: DiagnosticRequest {
                bus: 1,
                id: 2015,
                mode: 1,
                ..Default::default()
            },
        });
        assert_eq!(
            encode_string(&diagnostic),
            r#"{"command":"diagnostic","action":"cancel","request":{"bus":1,"id":2015,"mode":1}}"#
        );
    }

    #[test]
    fn test_encode_non_finite_rejected() {
        let message = VehicleMessage::simple("speed", f64::NAN);
        let mut buffer = [0u8; 64];
        assert_eq!(
            encode(&message, HexStyle::default(), &mut buffer),
            Err(EncodeError::NonFiniteNumber { field: "value" })
        );
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_buffer_too_small_scrubs() {
        let message = VehicleMessage::simple("engine_speed", 1250);
        let exact = encode_string(&message).len();

        let mut buffer = vec![0u8; exact - 1];
        assert_eq!(
            encode(&message, HexStyle::default(), &mut buffer),
            Err(EncodeError::BufferTooSmall {
                capacity: exact - 1
            })
        );
        assert!(buffer.iter().all(|&b| b == 0));

        let mut buffer = vec![0u8; exact];
        assert_eq!(encode(&message, HexStyle::default(), &mut buffer), Ok(exact));
    }

    #[test]
    fn test_encode_numbers_without_exponent() {
        let cases = [
            (1.0e16, "10000000000000000"),
            (1.0e20, "100000000000000000000"),
            (1.0e-7, "0.0000001"),
            (-2.5e-6, "-0.0000025"),
            (0.1, "0.1"),
        ];
        for (value, expected) in cases {
            let message = VehicleMessage::simple("odometer", value);
            assert_eq!(
                encode_string(&message),
                format!(r#"{{"name":"odometer","value":{}}}"#, expected)
            );
        }
    }

    #[test]
    fn test_encode_extreme_numbers_roundtrip() {
        for value in [f64::MAX, f64::MIN, f64::MIN_POSITIVE, 5e-324, 1.0e-7] {
            let message = VehicleMessage::simple("x", value);
            let mut buffer = [0u8; 512];
            let written = encode(&message, HexStyle::default(), &mut buffer).unwrap();
            let text = std::str::from_utf8(&buffer[..written]).unwrap();
            assert!(!text.contains("e-") && !text.contains("e+"), "{}", text);
            assert_eq!(crate::codec::decode(&buffer[..written]), Ok(message));
        }
    }

    #[test]
    fn test_slice_writer_refuses_partial_write() {
        use std::io::Write;

        let mut buffer = [0u8; 4];
        let mut writer = SliceWriter::new(&mut buffer);
        writer.write_all(b"ab").unwrap();
        assert!(writer.write_all(b"cde").is_err());
        assert_eq!(writer.position(), 2);
    }
}
