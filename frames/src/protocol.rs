//! Typed diagram vocabulary carried inside [`Frame`]s.
//!
//! The server owns the element tree and pushes [`Command`]s describing every
//! confirmed change. The canvas answers with [`Intent`]s: requests the server
//! may validate, apply, or ignore. Neither side waits on the other; an intent
//! only ever takes effect through a later command.
//!
//! Each variant maps to one namespaced syscall (see [`syscall`]) whose `data`
//! object is the variant's payload struct.

#[cfg(test)]
#[path = "protocol_test.rs"]
mod protocol_test;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Frame, Status};

/// Syscall names used on the diagram channel.
pub mod syscall {
    pub const INIT: &str = "diagram:init";
    pub const RESET: &str = "diagram:reset";
    pub const ENTITY_CREATE: &str = "entity:create";
    pub const ENTITY_UPDATE: &str = "entity:update";
    pub const ENTITY_DELETE: &str = "entity:delete";
    pub const COMPARTMENT_CREATE: &str = "compartment:create";
    pub const COMPARTMENT_DELETE: &str = "compartment:delete";
    pub const REQUIRE_CREATE: &str = "require:create";
    pub const REQUIRE_DELETE: &str = "require:delete";
    pub const PROVIDE_CREATE: &str = "provide:create";
    pub const PROVIDE_DELETE: &str = "provide:delete";
    pub const CONNECTOR_CREATE: &str = "connector:create";
    pub const CONNECTOR_DELETE: &str = "connector:delete";
    pub const VIEW_ZOOM_IN: &str = "view:zoom_in";
    pub const VIEW_ZOOM_OUT: &str = "view:zoom_out";
    pub const VIEW_LEFT: &str = "view:left";
    pub const VIEW_RIGHT: &str = "view:right";
    pub const VIEW_UP: &str = "view:up";
    pub const VIEW_DOWN: &str = "view:down";
    pub const DROP_HANDLE: &str = "drop:handle";

    pub const ELEMENT_SELECTED: &str = "element:selected";
    pub const ELEMENT_DELETED: &str = "element:deleted";
    pub const CONNECTOR_REQUEST: &str = "connector:request";
    pub const DROP_TARGET: &str = "drop:target";
    pub const CLIENT_LOG: &str = "client:log";
}

/// Error returned when a frame cannot be read as a [`Command`] or [`Intent`].
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The syscall is not part of the diagram vocabulary.
    #[error("unknown syscall: {0}")]
    UnknownSyscall(String),
    /// The syscall is known but its `data` does not match the payload shape.
    #[error("invalid payload for {syscall}: {source}")]
    Payload {
        syscall: String,
        #[source]
        source: serde_json::Error,
    },
    /// The peer answered with an error frame.
    #[error("{syscall} failed: {message}")]
    Remote { syscall: String, message: String },
}

// =============================================================
// Payloads
// =============================================================

/// Reference to a single element by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub id: String,
}

/// Entity creation or rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityArgs {
    pub id: String,
    pub name: String,
}

/// Compartment creation under an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentArgs {
    pub entity_id: String,
    pub id: String,
    pub name: String,
    /// Icon reference, resolved against resources registered by the host.
    #[serde(default)]
    pub icon: Option<String>,
}

/// Provide or require port creation under a compartment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortArgs {
    pub compartment_id: String,
    pub id: String,
    pub name: String,
}

/// Confirmed connector between two ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorArgs {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
}

/// Drag-and-drop gesture forwarded by the host for local hit-testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropArgs {
    /// Screen-space x in canvas pixels.
    pub x: f64,
    /// Screen-space y in canvas pixels.
    pub y: f64,
    pub payload: String,
}

/// Selection notification; `None` clears the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionArgs {
    pub id: Option<String>,
}

/// Request to join two ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub source_id: String,
    pub target_id: String,
}

/// Where a dropped payload landed; `None` means empty canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTargetArgs {
    pub id: Option<String>,
    pub payload: String,
}

/// Diagnostic passthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogArgs {
    pub message: String,
}

// =============================================================
// Server -> client
// =============================================================

/// A server push: a confirmed change the canvas must render.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init,
    CreateEntity(EntityArgs),
    UpdateEntity(EntityArgs),
    DeleteEntity(ElementRef),
    CreateCompartment(CompartmentArgs),
    DeleteCompartment(ElementRef),
    CreateRequire(PortArgs),
    CreateProvide(PortArgs),
    DeleteRequire(ElementRef),
    DeleteProvide(ElementRef),
    CreateConnector(ConnectorArgs),
    DeleteConnector(ElementRef),
    Reset,
    ZoomIn,
    ZoomOut,
    Left,
    Right,
    Up,
    Down,
    HandleDrop(DropArgs),
}

impl Command {
    /// Syscall name this command travels under.
    #[must_use]
    pub fn syscall(&self) -> &'static str {
        match self {
            Self::Init => syscall::INIT,
            Self::CreateEntity(_) => syscall::ENTITY_CREATE,
            Self::UpdateEntity(_) => syscall::ENTITY_UPDATE,
            Self::DeleteEntity(_) => syscall::ENTITY_DELETE,
            Self::CreateCompartment(_) => syscall::COMPARTMENT_CREATE,
            Self::DeleteCompartment(_) => syscall::COMPARTMENT_DELETE,
            Self::CreateRequire(_) => syscall::REQUIRE_CREATE,
            Self::CreateProvide(_) => syscall::PROVIDE_CREATE,
            Self::DeleteRequire(_) => syscall::REQUIRE_DELETE,
            Self::DeleteProvide(_) => syscall::PROVIDE_DELETE,
            Self::CreateConnector(_) => syscall::CONNECTOR_CREATE,
            Self::DeleteConnector(_) => syscall::CONNECTOR_DELETE,
            Self::Reset => syscall::RESET,
            Self::ZoomIn => syscall::VIEW_ZOOM_IN,
            Self::ZoomOut => syscall::VIEW_ZOOM_OUT,
            Self::Left => syscall::VIEW_LEFT,
            Self::Right => syscall::VIEW_RIGHT,
            Self::Up => syscall::VIEW_UP,
            Self::Down => syscall::VIEW_DOWN,
            Self::HandleDrop(_) => syscall::DROP_HANDLE,
        }
    }

    /// Read a command from a pushed frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Remote`] for error frames,
    /// [`ProtocolError::UnknownSyscall`] for syscalls outside the command set,
    /// and [`ProtocolError::Payload`] when `data` has the wrong shape.
    pub fn from_frame(frame: &Frame) -> Result<Self, ProtocolError> {
        reject_error_frame(frame)?;
        match frame.syscall.as_str() {
            syscall::INIT => Ok(Self::Init),
            syscall::RESET => Ok(Self::Reset),
            syscall::ENTITY_CREATE => payload(frame).map(Self::CreateEntity),
            syscall::ENTITY_UPDATE => payload(frame).map(Self::UpdateEntity),
            syscall::ENTITY_DELETE => payload(frame).map(Self::DeleteEntity),
            syscall::COMPARTMENT_CREATE => payload(frame).map(Self::CreateCompartment),
            syscall::COMPARTMENT_DELETE => payload(frame).map(Self::DeleteCompartment),
            syscall::REQUIRE_CREATE => payload(frame).map(Self::CreateRequire),
            syscall::PROVIDE_CREATE => payload(frame).map(Self::CreateProvide),
            syscall::REQUIRE_DELETE => payload(frame).map(Self::DeleteRequire),
            syscall::PROVIDE_DELETE => payload(frame).map(Self::DeleteProvide),
            syscall::CONNECTOR_CREATE => payload(frame).map(Self::CreateConnector),
            syscall::CONNECTOR_DELETE => payload(frame).map(Self::DeleteConnector),
            syscall::VIEW_ZOOM_IN => Ok(Self::ZoomIn),
            syscall::VIEW_ZOOM_OUT => Ok(Self::ZoomOut),
            syscall::VIEW_LEFT => Ok(Self::Left),
            syscall::VIEW_RIGHT => Ok(Self::Right),
            syscall::VIEW_UP => Ok(Self::Up),
            syscall::VIEW_DOWN => Ok(Self::Down),
            syscall::DROP_HANDLE => payload(frame).map(Self::HandleDrop),
            other => Err(ProtocolError::UnknownSyscall(other.to_owned())),
        }
    }

    /// Wrap this command in a [`Status::Done`] frame.
    #[must_use]
    pub fn to_frame(&self, id: impl Into<String>, ts: i64, diagram_id: Option<&str>) -> Frame {
        let data = match self {
            Self::CreateEntity(p) | Self::UpdateEntity(p) => to_data(p),
            Self::DeleteEntity(p)
            | Self::DeleteCompartment(p)
            | Self::DeleteRequire(p)
            | Self::DeleteProvide(p)
            | Self::DeleteConnector(p) => to_data(p),
            Self::CreateCompartment(p) => to_data(p),
            Self::CreateRequire(p) | Self::CreateProvide(p) => to_data(p),
            Self::CreateConnector(p) => to_data(p),
            Self::HandleDrop(p) => to_data(p),
            Self::Init
            | Self::Reset
            | Self::ZoomIn
            | Self::ZoomOut
            | Self::Left
            | Self::Right
            | Self::Up
            | Self::Down => Value::Object(serde_json::Map::new()),
        };
        build_frame(id.into(), ts, diagram_id, self.syscall(), Status::Done, data)
    }
}

// =============================================================
// Client -> server
// =============================================================

/// A client request. Fire-and-forget: no reply is awaited.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Selected(SelectionArgs),
    Deleted(ElementRef),
    CreateConnector(ConnectionRequest),
    DropTarget(DropTargetArgs),
    Log(LogArgs),
}

impl Intent {
    /// Selection changed to `id`, or cleared.
    #[must_use]
    pub fn selected(id: Option<&str>) -> Self {
        Self::Selected(SelectionArgs { id: id.map(str::to_owned) })
    }

    /// The user asked to delete `id`.
    #[must_use]
    pub fn deleted(id: &str) -> Self {
        Self::Deleted(ElementRef { id: id.to_owned() })
    }

    /// The user completed a drag from `source_id` to `target_id`.
    #[must_use]
    pub fn create_connector(source_id: &str, target_id: &str) -> Self {
        Self::CreateConnector(ConnectionRequest {
            source_id: source_id.to_owned(),
            target_id: target_id.to_owned(),
        })
    }

    /// A dropped payload landed on `id` (or on empty canvas).
    #[must_use]
    pub fn drop_target(id: Option<&str>, payload: impl Into<String>) -> Self {
        Self::DropTarget(DropTargetArgs { id: id.map(str::to_owned), payload: payload.into() })
    }

    #[must_use]
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log(LogArgs { message: message.into() })
    }

    /// Syscall name this intent travels under.
    #[must_use]
    pub fn syscall(&self) -> &'static str {
        match self {
            Self::Selected(_) => syscall::ELEMENT_SELECTED,
            Self::Deleted(_) => syscall::ELEMENT_DELETED,
            Self::CreateConnector(_) => syscall::CONNECTOR_REQUEST,
            Self::DropTarget(_) => syscall::DROP_TARGET,
            Self::Log(_) => syscall::CLIENT_LOG,
        }
    }

    /// Read an intent from a client frame.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Command::from_frame`].
    pub fn from_frame(frame: &Frame) -> Result<Self, ProtocolError> {
        reject_error_frame(frame)?;
        match frame.syscall.as_str() {
            syscall::ELEMENT_SELECTED => payload(frame).map(Self::Selected),
            syscall::ELEMENT_DELETED => payload(frame).map(Self::Deleted),
            syscall::CONNECTOR_REQUEST => payload(frame).map(Self::CreateConnector),
            syscall::DROP_TARGET => payload(frame).map(Self::DropTarget),
            syscall::CLIENT_LOG => payload(frame).map(Self::Log),
            other => Err(ProtocolError::UnknownSyscall(other.to_owned())),
        }
    }

    /// Wrap this intent in a [`Status::Request`] frame.
    #[must_use]
    pub fn to_frame(&self, id: impl Into<String>, ts: i64, diagram_id: Option<&str>) -> Frame {
        let data = match self {
            Self::Selected(p) => to_data(p),
            Self::Deleted(p) => to_data(p),
            Self::CreateConnector(p) => to_data(p),
            Self::DropTarget(p) => to_data(p),
            Self::Log(p) => to_data(p),
        };
        build_frame(id.into(), ts, diagram_id, self.syscall(), Status::Request, data)
    }
}

// =============================================================
// Helpers
// =============================================================

fn reject_error_frame(frame: &Frame) -> Result<(), ProtocolError> {
    if frame.status != Status::Error {
        return Ok(());
    }
    let message = frame
        .data
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unspecified error")
        .to_owned();
    Err(ProtocolError::Remote { syscall: frame.syscall.clone(), message })
}

fn payload<T: DeserializeOwned>(frame: &Frame) -> Result<T, ProtocolError> {
    serde_json::from_value(frame.data.clone())
        .map_err(|source| ProtocolError::Payload { syscall: frame.syscall.clone(), source })
}

fn to_data<T: Serialize>(payload: &T) -> Value {
    // Payload structs contain only strings, options and finite floats.
    serde_json::to_value(payload).unwrap_or(Value::Null)
}

fn build_frame(id: String, ts: i64, diagram_id: Option<&str>, syscall: &str, status: Status, data: Value) -> Frame {
    Frame {
        id,
        ts,
        diagram_id: diagram_id.map(str::to_owned),
        syscall: syscall.to_owned(),
        status,
        data,
    }
}
