//! Input model: mouse buttons, keys, cursors, and the interaction slots.
//!
//! There is no single gesture enum. The effective state is the combination of
//! independent single-slot fields on [`Interaction`]: something may be hovered
//! while something else is selected, and a connector drag may be in flight
//! while a node is hovered. Each input handler reads and rewrites these slots
//! within one synchronous call.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::connector::IntermediateConnector;
use crate::node::NodeRef;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` value. Back/forward buttons map to `None`.
    #[must_use]
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// `Delete` or `Backspace`.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Vertical scroll amount in pixels (positive = towards the user).
    pub dy: f64,
}

/// Pointer cursor requested by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Move,
}

impl Cursor {
    /// CSS `cursor` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Move => "move",
        }
    }
}

/// Transient interaction state owned by the scene graph.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    /// Node under the pointer, redrawn above its siblings.
    pub hovered: Option<NodeRef>,
    /// Persists until the next click replaces it.
    pub selected: Option<NodeRef>,
    /// Movable node following the pointer.
    pub dragging: Option<NodeRef>,
    /// Last pointer position in scene space.
    pub mouse: Option<Point>,
    /// In-progress connector drawn from a port to the pointer.
    pub temp_draw: Option<IntermediateConnector>,
    /// Listeners notified on every pointer-up.
    pub global_mouse_up: Vec<IntermediateConnector>,
    /// Incremented on every primary pointer-down.
    pub gesture: u64,
}

impl Interaction {
    /// Clear every slot that refers to `node`.
    pub fn forget(&mut self, node: &NodeRef) {
        for slot in [&mut self.hovered, &mut self.selected, &mut self.dragging] {
            if slot.as_ref() == Some(node) {
                *slot = None;
            }
        }
    }

    /// Drop an in-flight connector drag that started at `port_id`.
    pub fn dispose_drag_from(&mut self, port_id: &str) {
        if self.temp_draw.as_ref().is_some_and(|c| c.source_id == port_id) {
            self.temp_draw = None;
        }
        self.global_mouse_up.retain(|c| c.source_id != port_id);
    }

    /// Forget everything except the gesture counter.
    pub fn clear(&mut self) {
        *self = Self { gesture: self.gesture, ..Self::default() };
    }
}
