//! Vehicle message domain model
//!
//! A `VehicleMessage` carries exactly one kind of payload:
//! - **Simple**: a named signal reading
//! - **Raw**: a frame seen on a numbered bus
//! - **DiagnosticRequest / DiagnosticResponse**: a diagnostic exchange
//! - **CommandResponse**: the device's answer to a control command
//! - **Command**: a control command sent to the device
//!
//! Optional fields are `Option`s: an absent `pid` is not the same message
//! as `pid = 0`.

mod payload;

pub use payload::Payload;

use crate::codec::fields;
use crate::constants::{MAX_DIAGNOSTIC_PAYLOAD, MAX_FRAME_DATA};

/// Data bytes of a raw frame
pub type FrameData = Payload<MAX_FRAME_DATA>;

/// Payload bytes of a diagnostic request or response
pub type DiagnosticPayload = Payload<MAX_DIAGNOSTIC_PAYLOAD>;

/// Top-level message exchanged with the device
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleMessage {
    Simple(SimpleMessage),
    Raw(RawMessage),
    DiagnosticRequest(DiagnosticRequest),
    DiagnosticResponse(DiagnosticResponse),
    CommandResponse(CommandResponse),
    Command(ControlCommand),
}

/// Fieldless discriminant of a `VehicleMessage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    Simple,
    Raw,
    DiagnosticRequest,
    DiagnosticResponse,
    CommandResponse,
    Command,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Raw => "raw",
            Self::DiagnosticRequest => "diagnostic_request",
            Self::DiagnosticResponse => "diagnostic_response",
            Self::CommandResponse => "command_response",
            Self::Command => "command",
        }
    }
}

impl VehicleMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Simple(_) => MessageKind::Simple,
            Self::Raw(_) => MessageKind::Raw,
            Self::DiagnosticRequest(_) => MessageKind::DiagnosticRequest,
            Self::DiagnosticResponse(_) => MessageKind::DiagnosticResponse,
            Self::CommandResponse(_) => MessageKind::CommandResponse,
            Self::Command(_) => MessageKind::Command,
        }
    }

    /// Build a simple signal reading without an event
    pub fn simple(name: impl Into<String>, value: impl Into<SignalValue>) -> Self {
        Self::Simple(SimpleMessage {
            name: name.into(),
            value: value.into(),
            event: None,
        })
    }
}

// =============================================================================
// Simple
// =============================================================================

/// Value of a named signal
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl From<f64> for SignalValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for SignalValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for SignalValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for SignalValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Named signal reading
///
/// `event` is only present for stateful signals (e.g. a button with a
/// state and an event).
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleMessage {
    pub name: String,
    pub value: SignalValue,
    pub event: Option<SignalValue>,
}

// =============================================================================
// Raw
// =============================================================================

/// Frame on a numbered bus
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub bus: u8,
    pub id: u32,
    pub data: FrameData,
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Diagnostic request to send on a bus
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiagnosticRequest {
    pub bus: u8,
    pub id: u32,
    pub mode: u8,
    pub pid: Option<u16>,
    pub payload: Option<DiagnosticPayload>,
    /// Keep listening for responses from more than one module
    pub multiple_responses: Option<bool>,
    /// Repeat rate in Hz for recurring requests
    pub frequency: Option<f64>,
    /// Signal name to publish decoded responses under
    pub name: Option<String>,
}

/// Result of a diagnostic exchange
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiagnosticResponse {
    pub bus: u8,
    pub id: u32,
    pub mode: u8,
    pub pid: Option<u16>,
    pub success: bool,
    pub negative_response_code: Option<u8>,
    pub payload: Option<DiagnosticPayload>,
    pub value: Option<f64>,
}

// =============================================================================
// Commands
// =============================================================================

/// Closed vocabulary of control command names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Version,
    DeviceId,
    Diagnostic,
    Passthrough,
}

impl CommandName {
    pub const ALL: [CommandName; 4] = [
        Self::Version,
        Self::DeviceId,
        Self::Diagnostic,
        Self::Passthrough,
    ];

    /// Wire string for this command
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Version => fields::VERSION_COMMAND_NAME,
            Self::DeviceId => fields::DEVICE_ID_COMMAND_NAME,
            Self::Diagnostic => fields::DIAGNOSTIC_COMMAND_NAME,
            Self::Passthrough => fields::PASSTHROUGH_COMMAND_NAME,
        }
    }

    /// Look up a command by its wire string (exact, case-sensitive)
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.as_str() == name)
    }
}

/// Device acknowledgement of a control command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResponse {
    pub command: CommandName,
    pub message: Option<String>,
    pub status: bool,
}

/// What to do with a diagnostic request sent as a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticAction {
    Add,
    Cancel,
}

impl DiagnosticAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => fields::DIAGNOSTIC_ADD_ACTION,
            Self::Cancel => fields::DIAGNOSTIC_CANCEL_ACTION,
        }
    }

    pub fn from_wire(action: &str) -> Option<Self> {
        match action {
            fields::DIAGNOSTIC_ADD_ACTION => Some(Self::Add),
            fields::DIAGNOSTIC_CANCEL_ACTION => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Control command issued to the device
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    Version,
    DeviceId,
    Diagnostic {
        action: DiagnosticAction,
        request: DiagnosticRequest,
    },
    Passthrough {
        bus: u8,
        enabled: bool,
    },
}

impl ControlCommand {
    pub fn name(&self) -> CommandName {
        match self {
            Self::Version => CommandName::Version,
            Self::DeviceId => CommandName::DeviceId,
            Self::Diagnostic { .. } => CommandName::Diagnostic,
            Self::Passthrough { .. } => CommandName::Passthrough,
        }
    }
}
