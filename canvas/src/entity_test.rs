#![allow(clippy::float_cmp)]

use super::*;

fn entity_at(x: f64, y: f64) -> Entity {
    Entity::new("e1", "Box", Point::new(x, y), EntityMetrics::default())
}

/// Entity at (100, 100) with compartment c1 (2 requires, 1 provide) over c2 (empty).
fn populated() -> Entity {
    let mut entity = entity_at(100.0, 100.0);
    let mut c1 = Compartment::new("c1", "e1", "Net");
    c1.add_port(Port::new("r1", "c1", "in", PortKind::Require));
    c1.add_port(Port::new("r2", "c1", "aux", PortKind::Require));
    c1.add_port(Port::new("p1", "c1", "out", PortKind::Provide));
    entity.add_compartment(c1);
    entity.add_compartment(Compartment::new("c2", "e1", "Store"));
    entity
}

fn at(x: f64, y: f64) -> ScaledPoint {
    ScaledPoint { x, y, original_x: x, original_y: y }
}

fn key(name: &str) -> Key {
    Key(name.to_owned())
}

// =============================================================
// Heights and frames
// =============================================================

#[test]
fn empty_compartment_is_one_row() {
    assert_eq!(Compartment::new("c", "e", "n").height(50.0), 50.0);
}

#[test]
fn compartment_height_follows_longer_port_list() {
    let entity = populated();
    assert_eq!(entity.compartments[0].height(50.0), 100.0);
}

#[test]
fn entity_height_is_header_plus_compartments() {
    let entity = populated();
    assert_eq!(entity.height(), 25.0 + 100.0 + 50.0);
    assert_eq!(entity_at(0.0, 0.0).height(), 25.0);
}

#[test]
fn compartment_frames_stack_below_header() {
    let entity = populated();
    let frames: Vec<Rect> = entity.compartment_frames().map(|(_, f)| f).collect();
    assert_eq!(frames[0], Rect::new(100.0, 125.0, 200.0, 100.0));
    assert_eq!(frames[1], Rect::new(100.0, 225.0, 200.0, 50.0));
}

#[test]
fn height_tracks_port_removal() {
    let mut entity = populated();
    let removed = entity.compartments[0].remove_port("r2", PortKind::Require);
    assert!(removed.is_some());
    assert_eq!(entity.height(), 25.0 + 50.0 + 50.0);
}

#[test]
fn remove_port_with_wrong_kind_is_a_no_op() {
    let mut entity = populated();
    assert!(entity.compartments[0].remove_port("r1", PortKind::Provide).is_none());
    assert_eq!(entity.compartments[0].requires.len(), 2);
}

#[test]
fn remove_missing_compartment_returns_none() {
    let mut entity = populated();
    assert!(entity.remove_compartment("nope").is_none());
    assert!(entity.remove_compartment("c2").is_some());
    assert_eq!(entity.compartments.len(), 1);
}

// =============================================================
// Port geometry
// =============================================================

#[test]
fn require_port_attaches_on_right_edge() {
    let entity = populated();
    let view = entity.port("r1").expect("r1");
    assert_eq!(view.layout.anchor, Point::new(300.0, 150.0));
    assert_eq!(view.layout.connector, Point::new(312.5, 150.0));
    assert_eq!(view.layout.label, Point::new(305.0, 137.5));
    assert_eq!(view.layout.bounds, Rect::new(300.0, 137.5, 12.5, 25.0));
}

#[test]
fn second_require_port_is_one_row_lower() {
    let entity = populated();
    let view = entity.port("r2").expect("r2");
    assert_eq!(view.layout.connector, Point::new(312.5, 200.0));
}

#[test]
fn provide_port_attaches_left_of_tail_and_triangle() {
    let entity = populated();
    let view = entity.port("p1").expect("p1");
    let reach = 10.0 + 500.0_f64.sqrt();
    assert_eq!(view.layout.anchor, Point::new(100.0, 150.0));
    assert!((view.layout.connector.x - (100.0 - reach)).abs() < 1e-9);
    assert_eq!(view.layout.connector.y, 150.0);
    assert_eq!(view.layout.label, Point::new(90.0, 140.0));
    assert_eq!(view.layout.bounds.height, 20.0);
    assert!((view.layout.bounds.x - (100.0 - reach)).abs() < 1e-9);
}

#[test]
fn port_view_knows_its_owners() {
    let entity = populated();
    let view = entity.port("p1").expect("p1");
    assert_eq!(view.compartment.id, "c1");
    assert_eq!(view.entity.id, "e1");
    assert_eq!(view.port.compartment_id, "c1");
    assert_eq!(view.compartment.entity_id, "e1");
    assert!(entity.port("zz").is_none());
}

#[test]
fn ports_follow_entity_moves() {
    let mut entity = populated();
    entity.begin_move(Point::new(110.0, 110.0));
    entity.move_to(Point::new(160.0, 90.0));
    let view = entity.port("r1").expect("r1");
    assert_eq!(view.layout.connector, Point::new(362.5, 130.0));
}

// =============================================================
// Hit-testing
// =============================================================

#[test]
fn port_wins_over_compartment() {
    let entity = populated();
    let scene = SceneGraph::default();
    // (300, 150) lies on the c1 frame edge and inside r1's bounds.
    let hit = entity.hit_test(&scene, &at(300.0, 150.0));
    assert_eq!(hit, Some(NodeRef::Port(PortKind::Require, "r1".to_owned())));
}

#[test]
fn provide_glyph_outside_entity_still_hits_port() {
    let entity = populated();
    let scene = SceneGraph::default();
    let hit = entity.hit_test(&scene, &at(85.0, 150.0));
    assert_eq!(hit, Some(NodeRef::Port(PortKind::Provide, "p1".to_owned())));
}

#[test]
fn compartment_wins_over_entity() {
    let entity = populated();
    let scene = SceneGraph::default();
    let hit = entity.hit_test(&scene, &at(200.0, 250.0));
    assert_eq!(hit, Some(NodeRef::Compartment("c2".to_owned())));
}

#[test]
fn header_hits_entity() {
    let entity = populated();
    let scene = SceneGraph::default();
    assert_eq!(entity.hit_test(&scene, &at(150.0, 110.0)), Some(NodeRef::Entity("e1".to_owned())));
}

#[test]
fn outside_point_misses() {
    let entity = populated();
    let scene = SceneGraph::default();
    assert_eq!(entity.hit_test(&scene, &at(50.0, 50.0)), None);
    assert_eq!(entity.hit_test(&scene, &at(200.0, 276.0)), None);
}

// =============================================================
// Movement
// =============================================================

#[test]
fn drag_preserves_grab_offset() {
    let mut entity = entity_at(100.0, 100.0);
    entity.begin_move(Point::new(130.0, 105.0));
    entity.move_to(Point::new(230.0, 405.0));
    assert_eq!((entity.x, entity.y), (200.0, 400.0));
    entity.move_to(Point::new(0.0, 0.0));
    assert_eq!((entity.x, entity.y), (-30.0, -5.0));
}

// =============================================================
// Keys
// =============================================================

#[test]
fn delete_key_requests_entity_deletion() {
    let entity = entity_at(0.0, 0.0);
    assert_eq!(entity.key_up(&key("Delete")), Some(Intent::deleted("e1")));
    assert_eq!(entity.key_up(&key("a")), None);
}

#[test]
fn backspace_requests_compartment_deletion() {
    let entity = populated();
    assert_eq!(entity.compartments[1].key_up(&key("Backspace")), Some(Intent::deleted("c2")));
}

// =============================================================
// Connector drags
// =============================================================

#[test]
fn port_accepts_only_opposite_kind_from_other_port() {
    let require = Port::new("r1", "c1", "in", PortKind::Require);
    assert!(require.accepts(&IntermediateConnector::new("p1", PortKind::Provide, 1)));
    assert!(!require.accepts(&IntermediateConnector::new("r2", PortKind::Require, 1)));
    assert!(!require.accepts(&IntermediateConnector::new("r1", PortKind::Require, 1)));
}

#[test]
fn mouse_down_starts_intermediate_connector() {
    let port = Port::new("p1", "c1", "out", PortKind::Provide);
    let mut ui = Interaction { gesture: 4, ..Interaction::default() };
    port.mouse_down(&mut ui);
    let pending = ui.temp_draw.as_ref().expect("temp draw");
    assert_eq!(pending.source_id, "p1");
    assert_eq!(pending.gesture, 4);
    assert_eq!(ui.global_mouse_up.len(), 1);
}

#[test]
fn mouse_up_on_opposite_port_requests_connector() {
    let source = Port::new("p1", "c1", "out", PortKind::Provide);
    let target = Port::new("r1", "c2", "in", PortKind::Require);
    let mut ui = Interaction::default();
    source.mouse_down(&mut ui);
    assert_eq!(target.mouse_up(&ui), Some(Intent::create_connector("p1", "r1")));
}

#[test]
fn mouse_up_on_same_kind_is_dropped() {
    let source = Port::new("r1", "c1", "in", PortKind::Require);
    let target = Port::new("r2", "c2", "in", PortKind::Require);
    let mut ui = Interaction::default();
    source.mouse_down(&mut ui);
    assert_eq!(target.mouse_up(&ui), None);
}

#[test]
fn mouse_up_on_source_port_is_dropped() {
    let source = Port::new("r1", "c1", "in", PortKind::Require);
    let mut ui = Interaction::default();
    source.mouse_down(&mut ui);
    assert_eq!(source.mouse_up(&ui), None);
}

#[test]
fn mouse_up_ignores_connector_from_older_gesture() {
    let source = Port::new("p1", "c1", "out", PortKind::Provide);
    let target = Port::new("r1", "c2", "in", PortKind::Require);
    let mut ui = Interaction::default();
    source.mouse_down(&mut ui);
    ui.gesture += 1;
    assert_eq!(target.mouse_up(&ui), None);
}

// =============================================================
// Content layout
// =============================================================

#[test]
fn icon_is_capped_at_a_fifth_of_the_width() {
    let compartment = Compartment::new("c", "e", "n");
    let content = compartment.content(Rect::new(0.0, 0.0, 200.0, 100.0));
    assert_eq!(content.icon, Rect::new(5.0, 30.0, 40.0, 40.0));
    assert_eq!(content.label, Point::new(50.0, 50.0));
    assert_eq!(content.label_max_width, 145.0);
}

#[test]
fn icon_shrinks_to_available_height() {
    let compartment = Compartment::new("c", "e", "n");
    let content = compartment.content(Rect::new(0.0, 0.0, 200.0, 30.0));
    assert_eq!(content.icon.width, 20.0);
    assert_eq!(content.icon.y, 5.0);
}
