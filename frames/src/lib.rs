//! Wire model for the diagram sync channel.
//!
//! A [`Frame`] is one message between the diagram server and a browser
//! widget. The channel is fire-and-forget in both directions: the server
//! pushes `Done` frames that mutate the scene, the widget sends `Request`
//! frames describing user intent, and nothing is correlated after the fact.
//! Frames travel as protobuf; the payload stays open JSON so the typed
//! vocabulary in [`protocol`] can evolve without touching the codec.

pub mod protocol;

pub use protocol::{Command, Intent, ProtocolError};

use prost::Message;
use prost_types::value::Kind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed frame bytes: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("unknown frame status {0}")]
    InvalidStatus(i32),
}

// =============================================================================
// FRAME
// =============================================================================

/// Direction and outcome of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Widget → server intent.
    Request,
    /// Server → widget scene mutation.
    Done,
    /// Server rejection; `data.message` says why.
    Error,
}

impl Status {
    #[must_use]
    pub fn wire_code(self) -> i32 {
        WireStatus::from(self) as i32
    }
}

impl From<Status> for WireStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Request => Self::Request,
            Status::Done => Self::Done,
            Status::Error => Self::Error,
        }
    }
}

impl TryFrom<i32> for Status {
    type Error = CodecError;

    fn try_from(code: i32) -> Result<Self, CodecError> {
        match WireStatus::try_from(code) {
            Ok(WireStatus::Request) => Ok(Status::Request),
            Ok(WireStatus::Done) => Ok(Status::Done),
            Ok(WireStatus::Error) => Ok(Status::Error),
            Err(_) => Err(CodecError::InvalidStatus(code)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// UUID string, unique per frame.
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
    /// Set when the host page embeds more than one diagram.
    pub diagram_id: Option<String>,
    /// `noun:verb` operation name, e.g. `"entity:create"`.
    pub syscall: String,
    pub status: Status,
    pub data: Value,
}

// =============================================================================
// CODEC
// =============================================================================

#[must_use]
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    WireFrame::from(frame).encode_to_vec()
}

/// # Errors
///
/// Returns [`CodecError::Decode`] for bytes that are not a frame and
/// [`CodecError::InvalidStatus`] for a status code outside the enum.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, CodecError> {
    Frame::try_from(WireFrame::decode(bytes)?)
}

impl From<&Frame> for WireFrame {
    fn from(frame: &Frame) -> Self {
        Self {
            id: frame.id.clone(),
            ts: frame.ts,
            diagram_id: frame.diagram_id.clone(),
            syscall: frame.syscall.clone(),
            status: frame.status.wire_code(),
            data: Some(json_to_proto(&frame.data)),
        }
    }
}

impl TryFrom<WireFrame> for Frame {
    type Error = CodecError;

    fn try_from(wire: WireFrame) -> Result<Self, CodecError> {
        let status = Status::try_from(wire.status)?;
        // An absent payload reads as an empty object so argument-less
        // commands decode without special casing.
        let data = wire.data.as_ref().map_or_else(|| Value::Object(Map::new()), proto_to_json);
        Ok(Self { id: wire.id, ts: wire.ts, diagram_id: wire.diagram_id, syscall: wire.syscall, status, data })
    }
}

/// JSON numbers become protobuf doubles, so integer payload values come back
/// as floats.
fn json_to_proto(value: &Value) -> prost_types::Value {
    let null = || Kind::NullValue(prost_types::NullValue::NullValue.into());
    let kind = match value {
        Value::Null => null(),
        Value::Bool(b) => Kind::BoolValue(*b),
        Value::Number(n) => n.as_f64().map_or_else(null, Kind::NumberValue),
        Value::String(s) => Kind::StringValue(s.clone()),
        Value::Array(items) => Kind::ListValue(prost_types::ListValue { values: items.iter().map(json_to_proto).collect() }),
        Value::Object(entries) => Kind::StructValue(prost_types::Struct {
            fields: entries.iter().map(|(k, v)| (k.clone(), json_to_proto(v))).collect(),
        }),
    };
    prost_types::Value { kind: Some(kind) }
}

/// Non-finite doubles have no JSON form and read as `null`.
fn proto_to_json(value: &prost_types::Value) -> Value {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(*b),
        Some(Kind::NumberValue(n)) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
        Some(Kind::StringValue(s)) => Value::String(s.clone()),
        Some(Kind::ListValue(list)) => Value::Array(list.values.iter().map(proto_to_json).collect()),
        Some(Kind::StructValue(st)) => {
            Value::Object(st.fields.iter().map(|(k, v)| (k.clone(), proto_to_json(v))).collect())
        }
    }
}

// =============================================================================
// WIRE MESSAGES
// =============================================================================

#[derive(Clone, PartialEq, Message)]
struct WireFrame {
    #[prost(string, tag = "1")]
    id: String,
    #[prost(int64, tag = "2")]
    ts: i64,
    #[prost(string, optional, tag = "3")]
    diagram_id: Option<String>,
    #[prost(string, tag = "4")]
    syscall: String,
    #[prost(enumeration = "WireStatus", tag = "5")]
    status: i32,
    #[prost(message, optional, tag = "6")]
    data: Option<prost_types::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
enum WireStatus {
    Request = 0,
    Done = 1,
    Error = 2,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod lib_test;
