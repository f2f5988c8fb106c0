//! Entities, compartments and ports, and the geometry they derive.
//!
//! Only an entity stores a position. A compartment's frame follows from the
//! entity origin plus the heights of the compartments stacked above it, and a
//! port's glyph follows from its compartment frame and its index among
//! same-kind siblings. Nothing here is cached: every height and anchor is
//! recomputed from the current children on each call.

#[cfg(test)]
#[path = "entity_test.rs"]
mod entity_test;

use diagram_frames::Intent;

use crate::camera::{Point, ScaledPoint};
use crate::config::DiagramConfig;
use crate::connector::IntermediateConnector;
use crate::consts::{
    COMPARTMENT_INSET, ICON_WIDTH_FRACTION, PROVIDE_HYPOTENUSE, PROVIDE_LENGTH, PROVIDE_TAIL,
    REQUIRE_LABEL_INSET, REQUIRE_RADIUS,
};
use crate::hit::Rect;
use crate::input::{Interaction, Key};
use crate::node::{
    KeyReactive, MouseDownReactive, MouseUpReactive, Movable, NodeId, NodeRef, PortKind, Selectable, delete_intent,
};
use crate::scene::SceneGraph;

/// Title inset inside the entity header.
const TITLE_INSET: f64 = 10.0;

/// Sizes shared by an entity and everything it contains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityMetrics {
    pub width: f64,
    pub header_height: f64,
    pub row_height: f64,
    pub corner_radius: f64,
}

impl From<&DiagramConfig> for EntityMetrics {
    fn from(config: &DiagramConfig) -> Self {
        Self {
            width: config.entity_width,
            header_height: config.header_height,
            row_height: config.row_height,
            corner_radius: config.corner_radius,
        }
    }
}

impl Default for EntityMetrics {
    fn default() -> Self {
        Self::from(&DiagramConfig::default())
    }
}

// =============================================================
// Entity
// =============================================================

/// Root diagram shape: a titled header over a stack of compartments.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: NodeId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub metrics: EntityMetrics,
    pub compartments: Vec<Compartment>,
    grab: Point,
}

impl Entity {
    #[must_use]
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, origin: Point, metrics: EntityMetrics) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            x: origin.x,
            y: origin.y,
            metrics,
            compartments: Vec::new(),
            grab: Point::new(0.0, 0.0),
        }
    }

    #[must_use]
    pub fn compartments_height(&self) -> f64 {
        self.compartments.iter().map(|c| c.height(self.metrics.row_height)).sum()
    }

    /// Header plus every compartment.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.metrics.header_height + self.compartments_height()
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.metrics.width, self.height())
    }

    /// Where the title text starts, and how wide it may run.
    #[must_use]
    pub fn title_anchor(&self) -> (Point, f64) {
        (
            Point::new(self.x + TITLE_INSET, self.y + self.metrics.header_height / 2.0),
            self.metrics.width - 2.0 * TITLE_INSET,
        )
    }

    /// Each compartment with its current frame, top to bottom.
    pub fn compartment_frames(&self) -> impl Iterator<Item = (&Compartment, Rect)> {
        let row = self.metrics.row_height;
        let mut top = self.y + self.metrics.header_height;
        self.compartments.iter().map(move |compartment| {
            let height = compartment.height(row);
            let frame = Rect::new(self.x, top, self.metrics.width, height);
            top += height;
            (compartment, frame)
        })
    }

    #[must_use]
    pub fn compartment(&self, id: &str) -> Option<CompartmentView<'_>> {
        self.compartment_frames()
            .find(|(c, _)| c.id == id)
            .map(|(compartment, frame)| CompartmentView { entity: self, compartment, frame })
    }

    pub fn compartment_mut(&mut self, id: &str) -> Option<&mut Compartment> {
        self.compartments.iter_mut().find(|c| c.id == id)
    }

    #[must_use]
    pub fn port(&self, id: &str) -> Option<PortView<'_>> {
        self.compartment_frames().find_map(|(compartment, frame)| {
            compartment.port_index(id).map(|(port, index)| PortView {
                entity: self,
                compartment,
                port,
                layout: port.layout(frame, index, self.metrics.row_height),
            })
        })
    }

    pub fn add_compartment(&mut self, compartment: Compartment) {
        self.compartments.push(compartment);
    }

    pub fn remove_compartment(&mut self, id: &str) -> Option<Compartment> {
        let index = self.compartments.iter().position(|c| c.id == id)?;
        Some(self.compartments.remove(index))
    }
}

impl Selectable for Entity {
    fn hit_test(&self, _scene: &SceneGraph, point: &ScaledPoint) -> Option<NodeRef> {
        let pt = point.point();
        let row = self.metrics.row_height;
        for (compartment, frame) in self.compartment_frames() {
            if let Some(hit) = compartment.hit_test_in(frame, row, pt) {
                return Some(hit);
            }
        }
        self.bounds().contains(pt).then(|| NodeRef::Entity(self.id.clone()))
    }
}

impl Movable for Entity {
    fn begin_move(&mut self, point: Point) {
        self.grab = Point::new(point.x - self.x, point.y - self.y);
    }

    fn move_to(&mut self, point: Point) {
        self.x = point.x - self.grab.x;
        self.y = point.y - self.grab.y;
    }
}

impl KeyReactive for Entity {
    fn key_up(&self, key: &Key) -> Option<Intent> {
        delete_intent(&self.id, key)
    }
}

// =============================================================
// Compartment
// =============================================================

/// Named band of an entity holding two ordered port lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Compartment {
    pub id: NodeId,
    pub entity_id: NodeId,
    pub name: String,
    /// Icon reference as sent by the server.
    pub icon: Option<String>,
    /// Resolved icon resource; `None` renders without an icon.
    pub icon_url: Option<String>,
    pub provides: Vec<Port>,
    pub requires: Vec<Port>,
}

/// Placement of a compartment's icon and label inside its frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompartmentContent {
    pub icon: Rect,
    pub label: Point,
    pub label_max_width: f64,
}

impl Compartment {
    #[must_use]
    pub fn new(id: impl Into<NodeId>, entity_id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_id: entity_id.into(),
            name: name.into(),
            icon: None,
            icon_url: None,
            provides: Vec::new(),
            requires: Vec::new(),
        }
    }

    /// One row per port on the longer side, never fewer than one.
    #[must_use]
    pub fn height(&self, row_height: f64) -> f64 {
        let rows = self.provides.len().max(self.requires.len()).max(1);
        // Port counts stay far below f64's exact integer range.
        #[allow(clippy::cast_precision_loss)]
        let rows = rows as f64;
        rows * row_height
    }

    #[must_use]
    pub fn ports(&self, kind: PortKind) -> &[Port] {
        match kind {
            PortKind::Provide => &self.provides,
            PortKind::Require => &self.requires,
        }
    }

    /// The port with `id` and its index among same-kind siblings.
    #[must_use]
    pub fn port_index(&self, id: &str) -> Option<(&Port, usize)> {
        [PortKind::Require, PortKind::Provide].into_iter().find_map(|kind| {
            self.ports(kind).iter().enumerate().find(|(_, p)| p.id == id).map(|(i, p)| (p, i))
        })
    }

    pub fn add_port(&mut self, port: Port) {
        match port.kind {
            PortKind::Provide => self.provides.push(port),
            PortKind::Require => self.requires.push(port),
        }
    }

    /// Detach the port `id` if it is of `kind`.
    pub fn remove_port(&mut self, id: &str, kind: PortKind) -> Option<Port> {
        let ports = match kind {
            PortKind::Provide => &mut self.provides,
            PortKind::Require => &mut self.requires,
        };
        let index = ports.iter().position(|p| p.id == id)?;
        Some(ports.remove(index))
    }

    /// Icon box and label anchor. Space for the icon is reserved whether or
    /// not an image is available, so labels stay put while icons load.
    #[must_use]
    pub fn content(&self, frame: Rect) -> CompartmentContent {
        let max_icon = frame.width * ICON_WIDTH_FRACTION;
        let avail_h = frame.height - 2.0 * COMPARTMENT_INSET;
        let avail_w = frame.width - 2.0 * COMPARTMENT_INSET;
        let icon_side = max_icon.min(avail_h.min(avail_w));
        CompartmentContent {
            icon: Rect::new(
                frame.x + COMPARTMENT_INSET,
                frame.y + frame.height / 2.0 - icon_side / 2.0,
                icon_side,
                icon_side,
            ),
            label: Point::new(frame.x + 2.0 * COMPARTMENT_INSET + icon_side, frame.y + frame.height / 2.0),
            label_max_width: frame.width - 3.0 * COMPARTMENT_INSET - icon_side,
        }
    }

    /// Ports first (requires, then provides), then the compartment body.
    #[must_use]
    pub fn hit_test_in(&self, frame: Rect, row_height: f64, pt: Point) -> Option<NodeRef> {
        for kind in [PortKind::Require, PortKind::Provide] {
            for (index, port) in self.ports(kind).iter().enumerate() {
                if port.layout(frame, index, row_height).bounds.contains(pt) {
                    return Some(NodeRef::Port(kind, port.id.clone()));
                }
            }
        }
        frame.contains(pt).then(|| NodeRef::Compartment(self.id.clone()))
    }
}

impl KeyReactive for Compartment {
    fn key_up(&self, key: &Key) -> Option<Intent> {
        delete_intent(&self.id, key)
    }
}

// =============================================================
// Port
// =============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub id: NodeId,
    pub compartment_id: NodeId,
    pub name: String,
    pub kind: PortKind,
}

/// Derived port geometry, all in scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortLayout {
    /// Point on the compartment edge, at the row's vertical middle.
    pub anchor: Point,
    /// Where connectors attach.
    pub connector: Point,
    /// Label baseline anchor, outside the glyph.
    pub label: Point,
    pub bounds: Rect,
}

impl Port {
    #[must_use]
    pub fn new(id: impl Into<NodeId>, compartment_id: impl Into<NodeId>, name: impl Into<String>, kind: PortKind) -> Self {
        Self { id: id.into(), compartment_id: compartment_id.into(), name: name.into(), kind }
    }

    /// Geometry of the `index`-th port of this kind in a compartment at `frame`.
    #[must_use]
    pub fn layout(&self, frame: Rect, index: usize, row_height: f64) -> PortLayout {
        #[allow(clippy::cast_precision_loss)]
        let row_top = frame.y + index as f64 * row_height;
        let mid = row_top + row_height / 2.0;
        match self.kind {
            PortKind::Require => {
                let x = frame.x + frame.width;
                let r = REQUIRE_RADIUS;
                PortLayout {
                    anchor: Point::new(x, mid),
                    connector: Point::new(x + r, mid),
                    label: Point::new(x + REQUIRE_LABEL_INSET, mid - r),
                    bounds: Rect::new(x, mid - r, r, 2.0 * r),
                }
            }
            PortKind::Provide => {
                let x = frame.x;
                let half = PROVIDE_LENGTH / 2.0;
                PortLayout {
                    anchor: Point::new(x, mid),
                    connector: Point::new(x - PROVIDE_TAIL - PROVIDE_HYPOTENUSE, mid),
                    label: Point::new(x - PROVIDE_TAIL, mid - half),
                    bounds: Rect::new(x - PROVIDE_HYPOTENUSE - PROVIDE_TAIL, mid - half, PROVIDE_HYPOTENUSE, PROVIDE_LENGTH),
                }
            }
        }
    }

    /// Whether a drag started at `source` may finish on this port.
    #[must_use]
    pub fn accepts(&self, source: &IntermediateConnector) -> bool {
        source.source_id != self.id && source.source_kind == self.kind.opposite()
    }
}

impl MouseDownReactive for Port {
    fn mouse_down(&self, ui: &mut Interaction) {
        IntermediateConnector::new(&self.id, self.kind, ui.gesture).start(ui);
    }
}

impl MouseUpReactive for Port {
    fn mouse_up(&self, ui: &Interaction) -> Option<Intent> {
        let pending = ui.temp_draw.as_ref().filter(|c| c.gesture == ui.gesture)?;
        self.accepts(pending).then(|| Intent::create_connector(&pending.source_id, &self.id))
    }
}

// =============================================================
// Views
// =============================================================

/// A compartment resolved together with its owner and current frame.
#[derive(Debug, Clone, Copy)]
pub struct CompartmentView<'a> {
    pub entity: &'a Entity,
    pub compartment: &'a Compartment,
    pub frame: Rect,
}

/// A port resolved together with its owners and current layout.
#[derive(Debug, Clone, Copy)]
pub struct PortView<'a> {
    pub entity: &'a Entity,
    pub compartment: &'a Compartment,
    pub port: &'a Port,
    pub layout: PortLayout,
}
