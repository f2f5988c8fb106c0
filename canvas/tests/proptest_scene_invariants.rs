//! Property-based invariant tests for the diagram scene graph.
//!
//! Verifies:
//! 1. Entity height is the header plus every compartment height
//! 2. Compartment height is max(|provides|, |requires|, 1) rows
//! 3. A point on a port glyph resolves to the port, never its compartment
//! 4. Zooming in n times then out n times restores scale and inverse scale
//! 5. A drag keeps the grab offset recorded at begin_move
//! 6. Connector sameness is symmetric
//! 7. Deleting an entity twice leaves the same scene as deleting it once

#![allow(clippy::float_cmp)]

use diagram_canvas::camera::{Camera, Point};
use diagram_canvas::connector::Connector;
use diagram_canvas::engine::EngineCore;
use diagram_canvas::entity::{Compartment, Entity, EntityMetrics, Port};
use diagram_canvas::node::{Movable, NodeRef, PortKind, Selectable};
use diagram_canvas::scene::SceneGraph;
use diagram_frames::Command;
use diagram_frames::protocol::{CompartmentArgs, ElementRef, EntityArgs, PortArgs};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

/// (provides, requires) counts per compartment.
fn arb_layout() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..5, 0usize..5), 0..5)
}

fn build_entity(x: f64, y: f64, layout: &[(usize, usize)]) -> Entity {
    let mut entity = Entity::new("e", "Entity", Point::new(x, y), EntityMetrics::default());
    for (ci, &(provides, requires)) in layout.iter().enumerate() {
        let cid = format!("c{ci}");
        let mut compartment = Compartment::new(cid.clone(), "e", "c");
        for pi in 0..provides {
            compartment.add_port(Port::new(format!("{cid}-p{pi}"), cid.clone(), "p", PortKind::Provide));
        }
        for ri in 0..requires {
            compartment.add_port(Port::new(format!("{cid}-r{ri}"), cid.clone(), "r", PortKind::Require));
        }
        entity.add_compartment(compartment);
    }
    entity
}

fn scaled(x: f64, y: f64) -> diagram_canvas::camera::ScaledPoint {
    Camera::default().scale_point(x, y)
}

// ── Layout invariants ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn entity_height_sums_compartments(layout in arb_layout(), x in -500.0f64..500.0, y in -500.0f64..500.0) {
        let entity = build_entity(x, y, &layout);
        let row = entity.metrics.row_height;
        let expected: f64 = layout.iter().map(|&(p, r)| {
            #[allow(clippy::cast_precision_loss)]
            let rows = p.max(r).max(1) as f64;
            rows * row
        }).sum();
        prop_assert!((entity.height() - (entity.metrics.header_height + expected)).abs() < 1e-9);
        for (compartment, frame) in entity.compartment_frames() {
            prop_assert_eq!(frame.height, compartment.height(row));
        }
    }

    #[test]
    fn port_glyph_resolves_to_port(layout in arb_layout()) {
        let entity = build_entity(100.0, 100.0, &layout);
        let scene = SceneGraph::default();
        let row = entity.metrics.row_height;
        for (compartment, frame) in entity.compartment_frames() {
            for kind in [PortKind::Require, PortKind::Provide] {
                for (index, port) in compartment.ports(kind).iter().enumerate() {
                    let b = port.layout(frame, index, row).bounds;
                    let hit = entity.hit_test(&scene, &scaled(b.x + b.width / 2.0, b.y + b.height / 2.0));
                    prop_assert_eq!(hit, Some(NodeRef::Port(kind, port.id.clone())));
                }
            }
        }
    }
}

// ── Camera and drag invariants ────────────────────────────────────────

proptest! {
    #[test]
    fn zoom_round_trip_restores_scale(steps in 1usize..12) {
        let mut camera = Camera::default();
        for _ in 0..steps {
            camera.zoom_in();
        }
        for _ in 0..steps {
            camera.zoom_out();
        }
        prop_assert!((camera.scale - 1.0).abs() < 1e-9);
        prop_assert!((camera.invert_scale - 1.0).abs() < 1e-9);
        prop_assert_eq!((camera.pan_x, camera.pan_y), (0.0, 0.0));
    }

    #[test]
    fn drag_preserves_grab_offset(
        gx in 0.0f64..200.0,
        gy in 0.0f64..25.0,
        path in prop::collection::vec((-1000.0f64..1000.0, -1000.0f64..1000.0), 1..8),
    ) {
        let mut entity = build_entity(100.0, 100.0, &[]);
        entity.begin_move(Point::new(100.0 + gx, 100.0 + gy));
        for &(px, py) in &path {
            entity.move_to(Point::new(px, py));
            prop_assert!((entity.x - (px - gx)).abs() < 1e-9);
            prop_assert!((entity.y - (py - gy)).abs() < 1e-9);
        }
    }

    #[test]
    fn connector_sameness_is_symmetric(a in "[a-d]", b in "[a-d]", c in "[a-d]") {
        let ab = Connector::new("k1", a.clone(), b.clone());
        let ba = Connector::new("k2", b.clone(), a.clone());
        prop_assert!(ab.is_same(&ba));
        let ac = Connector::new("k3", a.clone(), c.clone());
        prop_assert_eq!(ab.is_same(&ac), b == c || (a == c && b == a));
    }
}

// ── Sync idempotence ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn delete_entity_is_idempotent(layout in arb_layout()) {
        let mut core = EngineCore::default();
        core.apply(Command::CreateEntity(EntityArgs { id: "e".into(), name: "E".into() }));
        for (ci, &(provides, requires)) in layout.iter().enumerate() {
            let cid = format!("c{ci}");
            core.apply(Command::CreateCompartment(CompartmentArgs {
                entity_id: "e".into(),
                id: cid.clone(),
                name: cid.clone(),
                icon: None,
            }));
            for pi in 0..provides {
                core.apply(Command::CreateProvide(PortArgs { compartment_id: cid.clone(), id: format!("{cid}-p{pi}"), name: "p".into() }));
            }
            for ri in 0..requires {
                core.apply(Command::CreateRequire(PortArgs { compartment_id: cid.clone(), id: format!("{cid}-r{ri}"), name: "r".into() }));
            }
        }
        core.apply(Command::DeleteEntity(ElementRef { id: "e".into() }));
        let once = (core.scene.roots.clone(), core.scene.connectors.clone());
        core.apply(Command::DeleteEntity(ElementRef { id: "e".into() }));
        prop_assert_eq!((core.scene.roots.clone(), core.scene.connectors.clone()), once);
        prop_assert_eq!(core.scene.roots.len(), 2);
    }
}
