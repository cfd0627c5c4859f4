//! JSON codec for vehicle telemetry, diagnostic and control messages
//!
//! A device and its host exchange one JSON object per message:
//!
//! ```text
//! {"name":"engine_speed","value":1250}
//! {"bus":1,"id":1234,"data":"deadbeef"}
//! {"bus":1,"id":2016,"mode":1,"pid":12,"success":true,"value":42}
//! {"command_response":"version","message":"6.0-dev","status":true}
//! ```
//!
//! [`codec::decode`] turns a payload into a [`message::VehicleMessage`];
//! [`codec::encode`] writes one back into a caller-owned buffer.

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod message;
pub mod stats;

pub use codec::{decode, encode, try_encode, Codec, CodecOptions, JsonCodec};
pub use error::{DecodeError, EncodeError};
pub use message::VehicleMessage;
