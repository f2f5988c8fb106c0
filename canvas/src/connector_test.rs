use super::*;
use crate::camera::Point;
use crate::entity::{Compartment, Entity, EntityMetrics, Port};

/// Require port r1 on e1 at (100, 100), provide port p2 on e2 at (500, 100).
fn linked_scene() -> SceneGraph {
    let mut scene = SceneGraph::default();
    for (eid, x, pid, kind) in [("e1", 100.0, "r1", PortKind::Require), ("e2", 500.0, "p2", PortKind::Provide)] {
        let cid = format!("{eid}-c");
        let mut entity = Entity::new(eid, eid, Point::new(x, 100.0), EntityMetrics::default());
        let mut compartment = Compartment::new(cid.clone(), eid, "c");
        compartment.add_port(Port::new(pid, cid, pid, kind));
        entity.add_compartment(compartment);
        scene.add_entity(entity);
    }
    scene
}

fn at(x: f64, y: f64) -> ScaledPoint {
    ScaledPoint { x, y, original_x: x, original_y: y }
}

// =============================================================
// Connector
// =============================================================

#[test]
fn sameness_ignores_direction() {
    let a = Connector::new("k1", "r1", "p2");
    assert!(a.is_same(&Connector::new("k2", "p2", "r1")));
    assert!(a.is_same(&Connector::new("k3", "r1", "p2")));
    assert!(!a.is_same(&Connector::new("k4", "r1", "p3")));
}

#[test]
fn touches_either_end() {
    let c = Connector::new("k1", "r1", "p2");
    assert!(c.touches("r1"));
    assert!(c.touches("p2"));
    assert!(!c.touches("k1"));
}

#[test]
fn hit_band_follows_the_line() {
    let scene = linked_scene();
    let c = Connector::new("k1", "r1", "p2");
    assert_eq!(c.hit_test(&scene, &at(400.0, 150.0)), Some(NodeRef::Connector("k1".to_owned())));
    assert_eq!(c.hit_test(&scene, &at(400.0, 154.0)), Some(NodeRef::Connector("k1".to_owned())));
    assert_eq!(c.hit_test(&scene, &at(400.0, 170.0)), None);
}

#[test]
fn dangling_connector_is_never_hit() {
    let scene = linked_scene();
    let c = Connector::new("k1", "r1", "gone");
    assert_eq!(c.hit_test(&scene, &at(400.0, 150.0)), None);
}

#[test]
fn delete_key_requests_deletion() {
    let c = Connector::new("k1", "r1", "p2");
    assert_eq!(c.key_up(&Key("Delete".to_owned())), Some(Intent::deleted("k1")));
    assert_eq!(c.key_up(&Key("Enter".to_owned())), None);
}

// =============================================================
// Intermediate connector
// =============================================================

#[test]
fn start_registers_overlay_and_listener() {
    let mut ui = Interaction::default();
    IntermediateConnector::new("r1", PortKind::Require, 3).start(&mut ui);
    assert_eq!(ui.temp_draw, Some(IntermediateConnector::new("r1", PortKind::Require, 3)));
    assert_eq!(ui.global_mouse_up.len(), 1);
}

#[test]
fn global_mouse_up_clears_own_overlay_and_unregisters() {
    let mut ui = Interaction::default();
    let drag = IntermediateConnector::new("r1", PortKind::Require, 1);
    drag.clone().start(&mut ui);
    assert!(!drag.global_mouse_up(&mut ui));
    assert!(ui.temp_draw.is_none());
}

#[test]
fn stale_listener_leaves_newer_overlay() {
    let mut ui = Interaction::default();
    let old = IntermediateConnector::new("r1", PortKind::Require, 1);
    IntermediateConnector::new("p2", PortKind::Provide, 2).start(&mut ui);
    assert!(!old.global_mouse_up(&mut ui));
    assert!(ui.temp_draw.is_some());
}
