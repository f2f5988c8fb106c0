//! Scene graph: the client-held node tree plus transient interaction state.
//!
//! The graph owns an ordered list of root nodes (entities and the two overlay
//! controls) and a separate connector list that is always hit-tested before
//! the roots. All structural removal goes through this module so that every
//! interaction slot pointing at a removed node is cleared in the same call.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use diagram_frames::Intent;

use crate::camera::{Camera, Point, ScaledPoint};
use crate::config::DiagramConfig;
use crate::connector::Connector;
use crate::controls::{MoveControl, ZoomControl};
use crate::entity::{Compartment, CompartmentView, Entity, PortView};
use crate::input::Interaction;
use crate::node::{
    Clickable, ControlKind, GlobalMouseUpReactive, KeyReactive, MouseDownReactive, MouseUpReactive, Movable, NodeRef,
    PortKind, Selectable,
};

/// A node held directly in the root list.
#[derive(Debug, Clone, PartialEq)]
pub enum RootNode {
    Entity(Entity),
    Move(MoveControl),
    Zoom(ZoomControl),
}

impl RootNode {
    #[must_use]
    pub fn node_ref(&self) -> NodeRef {
        match self {
            Self::Entity(entity) => NodeRef::Entity(entity.id.clone()),
            Self::Move(_) => NodeRef::Control(ControlKind::Move),
            Self::Zoom(_) => NodeRef::Control(ControlKind::Zoom),
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            Self::Move(_) | Self::Zoom(_) => None,
        }
    }

    fn as_selectable(&self) -> &dyn Selectable {
        match self {
            Self::Entity(entity) => entity,
            Self::Move(control) => control,
            Self::Zoom(control) => control,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    /// Hit priority and draw order.
    pub roots: Vec<RootNode>,
    pub connectors: Vec<Connector>,
    pub camera: Camera,
    pub ui: Interaction,
    pub config: DiagramConfig,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(DiagramConfig::default())
    }
}

impl SceneGraph {
    /// Empty scene seeded with the two overlay controls.
    #[must_use]
    pub fn new(config: DiagramConfig) -> Self {
        let mut scene = Self {
            roots: Vec::new(),
            connectors: Vec::new(),
            camera: Camera::default(),
            ui: Interaction::default(),
            config,
        };
        scene.seed_controls();
        scene
    }

    fn seed_controls(&mut self) {
        self.roots.push(RootNode::Move(MoveControl::default()));
        self.roots.push(RootNode::Zoom(ZoomControl::default()));
    }

    /// Drop every entity and connector, then re-seed the overlay controls.
    pub fn reset(&mut self) {
        self.roots.clear();
        self.connectors.clear();
        self.ui.clear();
        self.seed_controls();
    }

    // --- Lookups ---

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.roots.iter().filter_map(RootNode::as_entity)
    }

    #[must_use]
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.roots.iter_mut().find_map(|root| match root {
            RootNode::Entity(entity) if entity.id == id => Some(entity),
            _ => None,
        })
    }

    #[must_use]
    pub fn compartment(&self, id: &str) -> Option<CompartmentView<'_>> {
        self.entities().find_map(|e| e.compartment(id))
    }

    pub fn compartment_mut(&mut self, id: &str) -> Option<&mut Compartment> {
        self.roots.iter_mut().find_map(|root| match root {
            RootNode::Entity(entity) => entity.compartment_mut(id),
            RootNode::Move(_) | RootNode::Zoom(_) => None,
        })
    }

    #[must_use]
    pub fn port(&self, id: &str) -> Option<PortView<'_>> {
        self.entities().find_map(|e| e.port(id))
    }

    #[must_use]
    pub fn connector(&self, id: &str) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.id == id)
    }

    /// Connectors with `port_id` at either end.
    pub fn connectors_of<'a>(&'a self, port_id: &'a str) -> impl Iterator<Item = &'a Connector> {
        self.connectors.iter().filter(move |c| c.touches(port_id))
    }

    /// Whether any entity, compartment, port or connector uses `id`.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.entity(id).is_some() || self.compartment(id).is_some() || self.port(id).is_some() || self.connector(id).is_some()
    }

    /// Whether `node` still resolves to something in the scene.
    #[must_use]
    pub fn resolves(&self, node: &NodeRef) -> bool {
        match node {
            NodeRef::Entity(id) => self.entity(id).is_some(),
            NodeRef::Compartment(id) => self.compartment(id).is_some(),
            NodeRef::Port(kind, id) => self.port(id).is_some_and(|v| v.port.kind == *kind),
            NodeRef::Connector(id) => self.connector(id).is_some(),
            NodeRef::Control(_) => true,
        }
    }

    // --- Structure ---

    pub fn add_entity(&mut self, entity: Entity) {
        self.roots.push(RootNode::Entity(entity));
    }

    /// Remove an entity after tearing down each of its compartments.
    ///
    /// Returns `false` when no entity has this id.
    pub fn remove_entity(&mut self, id: &str) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        let compartment_ids: Vec<String> = entity.compartments.iter().map(|c| c.id.clone()).collect();
        self.ui.forget(&NodeRef::Entity(id.to_owned()));
        for compartment_id in &compartment_ids {
            self.remove_compartment(compartment_id);
        }
        self.roots.retain(|root| root.as_entity().is_none_or(|e| e.id != id));
        true
    }

    /// Remove a compartment after tearing down each of its ports.
    pub fn remove_compartment(&mut self, id: &str) -> bool {
        let Some(view) = self.compartment(id) else {
            return false;
        };
        let entity_id = view.compartment.entity_id.clone();
        let ports: Vec<(PortKind, String)> = [PortKind::Provide, PortKind::Require]
            .into_iter()
            .flat_map(|kind| view.compartment.ports(kind).iter().map(move |p| (kind, p.id.clone())))
            .collect();
        self.ui.forget(&NodeRef::Compartment(id.to_owned()));
        for (kind, port_id) in &ports {
            self.remove_port(port_id, *kind);
        }
        if let Some(entity) = self.entity_mut(&entity_id) {
            entity.remove_compartment(id);
        }
        true
    }

    /// Remove a port of `kind` with its incident connectors.
    ///
    /// A port of the other kind with the same id is left untouched.
    pub fn remove_port(&mut self, id: &str, kind: PortKind) -> bool {
        let Some(view) = self.port(id).filter(|v| v.port.kind == kind) else {
            return false;
        };
        let compartment_id = view.port.compartment_id.clone();
        self.ui.forget(&NodeRef::Port(kind, id.to_owned()));
        self.ui.dispose_drag_from(id);
        let incident: Vec<String> = self.connectors_of(id).map(|c| c.id.clone()).collect();
        for connector_id in &incident {
            self.remove_connector(connector_id);
        }
        if let Some(compartment) = self.compartment_mut(&compartment_id) {
            compartment.remove_port(id, kind);
        }
        true
    }

    /// Append `connector` unless one already joins the same port pair.
    pub fn add_connector(&mut self, connector: Connector) -> bool {
        if self.connectors.iter().any(|c| c.is_same(&connector)) {
            return false;
        }
        self.connectors.push(connector);
        true
    }

    pub fn remove_connector(&mut self, id: &str) -> bool {
        let Some(index) = self.connectors.iter().position(|c| c.id == id) else {
            return false;
        };
        self.ui.forget(&NodeRef::Connector(id.to_owned()));
        self.connectors.remove(index);
        true
    }

    // --- Connector display rules ---

    /// Scene-space attachment points of both ends, if both ports resolve.
    #[must_use]
    pub fn connector_endpoints(&self, connector: &Connector) -> Option<(Point, Point)> {
        let source = self.port(&connector.source_id)?;
        let target = self.port(&connector.target_id)?;
        Some((source.layout.connector, target.layout.connector))
    }

    /// Both ends belong to the same entity.
    #[must_use]
    pub fn is_internal(&self, connector: &Connector) -> bool {
        match (self.port(&connector.source_id), self.port(&connector.target_id)) {
            (Some(source), Some(target)) => source.entity.id == target.entity.id,
            _ => false,
        }
    }

    /// Internal connectors show only while they, or a compartment at either
    /// end, are selected.
    #[must_use]
    pub fn is_visible(&self, connector: &Connector) -> bool {
        if !self.is_internal(connector) {
            return true;
        }
        let Some(selected) = &self.ui.selected else {
            return false;
        };
        match selected {
            NodeRef::Connector(id) => *id == connector.id,
            NodeRef::Compartment(id) => [&connector.source_id, &connector.target_id]
                .into_iter()
                .filter_map(|port_id| self.port(port_id))
                .any(|view| view.compartment.id == *id),
            _ => false,
        }
    }

    /// The port has at least one internal connector.
    #[must_use]
    pub fn is_internally_connected(&self, port_id: &str) -> bool {
        self.connectors_of(port_id).any(|c| self.is_internal(c))
    }

    // --- Hit-testing ---

    /// First root node hit, in root order.
    #[must_use]
    pub fn hit_test_roots(&self, point: &ScaledPoint) -> Option<NodeRef> {
        self.roots.iter().find_map(|root| root.as_selectable().hit_test(self, point))
    }

    /// Connectors first, then root nodes.
    #[must_use]
    pub fn hit_test_all(&self, point: &ScaledPoint) -> Option<NodeRef> {
        self.connectors
            .iter()
            .find_map(|c| c.hit_test(self, point))
            .or_else(|| self.hit_test_roots(point))
    }

    // --- Capability dispatch ---

    pub fn movable_mut(&mut self, node: &NodeRef) -> Option<&mut dyn Movable> {
        match node {
            NodeRef::Entity(id) => self.entity_mut(id).map(|e| e as &mut dyn Movable),
            _ => None,
        }
    }

    #[must_use]
    pub fn key_reactive(&self, node: &NodeRef) -> Option<&dyn KeyReactive> {
        match node {
            NodeRef::Entity(id) => self.entity(id).map(|e| e as &dyn KeyReactive),
            NodeRef::Compartment(id) => self.compartment(id).map(|v| v.compartment as &dyn KeyReactive),
            NodeRef::Connector(id) => self.connector(id).map(|c| c as &dyn KeyReactive),
            NodeRef::Port(..) | NodeRef::Control(_) => None,
        }
    }

    #[must_use]
    pub fn clickable(&self, node: &NodeRef) -> Option<&dyn Clickable> {
        let NodeRef::Control(kind) = node else {
            return None;
        };
        self.roots.iter().find_map(|root| match (root, kind) {
            (RootNode::Move(control), ControlKind::Move) => Some(control as &dyn Clickable),
            (RootNode::Zoom(control), ControlKind::Zoom) => Some(control as &dyn Clickable),
            _ => None,
        })
    }

    /// Run the mouse-down hook of `node`, if it has one.
    pub fn press(&mut self, node: &NodeRef) {
        let Self { roots, ui, .. } = self;
        if let Some(target) = mouse_down_target(roots, node) {
            target.mouse_down(ui);
        }
    }

    /// Run the mouse-up hook of `node`, if it has one.
    #[must_use]
    pub fn release(&self, node: &NodeRef) -> Option<Intent> {
        let NodeRef::Port(_, id) = node else {
            return None;
        };
        let view = self.port(id)?;
        let target: &dyn MouseUpReactive = view.port;
        target.mouse_up(&self.ui)
    }

    /// Notify every global pointer-up listener; keep those that ask to stay.
    pub fn notify_global_mouse_up(&mut self) {
        let listeners = std::mem::take(&mut self.ui.global_mouse_up);
        let mut kept = Vec::new();
        for listener in listeners {
            if listener.global_mouse_up(&mut self.ui) {
                kept.push(listener);
            }
        }
        kept.append(&mut self.ui.global_mouse_up);
        self.ui.global_mouse_up = kept;
    }
}

fn mouse_down_target<'a>(roots: &'a [RootNode], node: &NodeRef) -> Option<&'a dyn MouseDownReactive> {
    let NodeRef::Port(_, id) = node else {
        return None;
    };
    roots
        .iter()
        .filter_map(RootNode::as_entity)
        .find_map(|e| e.port(id))
        .map(|view| view.port as &dyn MouseDownReactive)
}

