//! Scene node handles and the capability traits nodes opt into.
//!
//! Nodes are owned by the [`SceneGraph`]; everything else refers to them
//! through a [`NodeRef`], which names the node kind and its server id. The
//! input dispatcher resolves a `NodeRef` back to the node and asks it for the
//! capabilities it needs. A node implements only the traits that apply to it:
//! an entity moves and reacts to delete keys, a port starts and completes
//! connector drags, the overlay controls react to clicks.

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;

use diagram_frames::Intent;

use crate::camera::{Point, ScaledPoint, ViewStep};
use crate::consts::{MOVE_CONTROL_ID, ZOOM_CONTROL_ID};
use crate::input::{Interaction, Key};
use crate::scene::SceneGraph;

/// Server-assigned element identifier.
pub type NodeId = String;

/// The two port variants. A connector joins one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Emits leftward from the compartment.
    Provide,
    /// Emits rightward from the compartment.
    Require,
}

impl PortKind {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Provide => Self::Require,
            Self::Require => Self::Provide,
        }
    }
}

/// The two fixed overlay controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Move,
    Zoom,
}

impl ControlKind {
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Move => MOVE_CONTROL_ID,
            Self::Zoom => ZOOM_CONTROL_ID,
        }
    }
}

/// Handle to a node held by the scene graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    Entity(NodeId),
    Compartment(NodeId),
    Port(PortKind, NodeId),
    Connector(NodeId),
    Control(ControlKind),
}

impl NodeRef {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Entity(id) | Self::Compartment(id) | Self::Port(_, id) | Self::Connector(id) => id,
            Self::Control(kind) => kind.id(),
        }
    }

    /// Whether the node sits directly in the root list.
    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Entity(_) | Self::Control(_))
    }
}

// =============================================================
// Capabilities
// =============================================================

/// Hit-testing. Composite nodes return their deepest hit child.
pub trait Selectable {
    fn hit_test(&self, scene: &SceneGraph, point: &ScaledPoint) -> Option<NodeRef>;
}

/// Drag-to-move. The grab offset recorded by `begin_move` is kept for the
/// whole drag.
pub trait Movable {
    fn begin_move(&mut self, point: Point);
    fn move_to(&mut self, point: Point);
}

/// Keyboard reaction. Deletion is only ever requested, never applied locally.
pub trait KeyReactive {
    fn key_up(&self, key: &Key) -> Option<Intent>;
}

/// Discrete click reaction, used by the overlay controls.
pub trait Clickable {
    fn click(&self, point: &ScaledPoint) -> Option<ViewStep>;
}

pub trait MouseDownReactive {
    fn mouse_down(&self, ui: &mut Interaction);
}

pub trait MouseUpReactive {
    fn mouse_up(&self, ui: &Interaction) -> Option<Intent>;
}

/// Notified on every pointer-up, wherever the pointer was released.
///
/// Returns `true` to stay registered for the next pointer-up.
pub trait GlobalMouseUpReactive {
    fn global_mouse_up(&self, ui: &mut Interaction) -> bool;
}

/// Deletion intent for `id` when `key` is a delete key.
pub(crate) fn delete_intent(id: &str, key: &Key) -> Option<Intent> {
    key.is_delete().then(|| Intent::deleted(id))
}
