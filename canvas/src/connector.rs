//! Connectors between ports, and the overlay drawn while one is being dragged.

#[cfg(test)]
#[path = "connector_test.rs"]
mod connector_test;

use diagram_frames::Intent;

use crate::camera::ScaledPoint;
use crate::hit;
use crate::input::{Interaction, Key};
use crate::node::{GlobalMouseUpReactive, KeyReactive, NodeId, NodeRef, PortKind, Selectable, delete_intent};
use crate::scene::SceneGraph;

/// A server-confirmed edge between two ports, referenced by id.
///
/// Source and target keep creation order for protocol replay; rendering and
/// sameness treat the connector as undirected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    pub id: NodeId,
    pub source_id: NodeId,
    pub target_id: NodeId,
}

impl Connector {
    #[must_use]
    pub fn new(id: impl Into<NodeId>, source_id: impl Into<NodeId>, target_id: impl Into<NodeId>) -> Self {
        Self { id: id.into(), source_id: source_id.into(), target_id: target_id.into() }
    }

    /// Same unordered port pair.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        (self.source_id == other.source_id && self.target_id == other.target_id)
            || (self.source_id == other.target_id && self.target_id == other.source_id)
    }

    #[must_use]
    pub fn touches(&self, port_id: &str) -> bool {
        self.source_id == port_id || self.target_id == port_id
    }
}

impl Selectable for Connector {
    fn hit_test(&self, scene: &SceneGraph, point: &ScaledPoint) -> Option<NodeRef> {
        let (from, to) = scene.connector_endpoints(self)?;
        let band = hit::segment_band(from, to, scene.config.connector_hit_thickness)?;
        hit::point_in_polygon(point.point(), &band).then(|| NodeRef::Connector(self.id.clone()))
    }
}

impl KeyReactive for Connector {
    fn key_up(&self, key: &Key) -> Option<Intent> {
        delete_intent(&self.id, key)
    }
}

// =============================================================
// Intermediate connector
// =============================================================

/// The line followed by the pointer while a connector is dragged out of a
/// port, before any target is known. Purely local; never sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateConnector {
    pub source_id: NodeId,
    pub source_kind: PortKind,
    /// Pointer gesture that spawned this overlay.
    pub gesture: u64,
}

impl IntermediateConnector {
    #[must_use]
    pub fn new(source_id: &str, source_kind: PortKind, gesture: u64) -> Self {
        Self { source_id: source_id.to_owned(), source_kind, gesture }
    }

    /// Become the temporary draw node and listen for the next pointer-up.
    pub fn start(self, ui: &mut Interaction) {
        ui.global_mouse_up.push(self.clone());
        ui.temp_draw = Some(self);
    }
}

impl GlobalMouseUpReactive for IntermediateConnector {
    fn global_mouse_up(&self, ui: &mut Interaction) -> bool {
        if ui.temp_draw.as_ref() == Some(self) {
            ui.temp_draw = None;
        }
        false
    }
}
