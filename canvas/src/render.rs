//! Rendering: draws the full diagram scene to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives a read-only view of the scene graph and produces pixels; it does
//! not mutate any application state.
//!
//! The layer order is computed by [`frame_plan`], which is pure and tested
//! natively. All fallible `Canvas2D` calls propagate errors via
//! `Result<(), JsValue>`; the top-level caller ([`crate::engine::Engine::render`])
//! handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::camera::{Camera, Point};
use crate::connector::Connector;
use crate::consts::{HIDDEN_CONNECTOR_MARKER, PROVIDE_HYPOTENUSE, PROVIDE_LENGTH, PROVIDE_TAIL, REQUIRE_RADIUS};
use crate::controls::{MoveControl, ZoomControl};
use crate::entity::{Compartment, Entity, PortView};
use crate::hit::Rect;
use crate::node::{ControlKind, NodeId, NodeRef, PortKind};
use crate::scene::{RootNode, SceneGraph};

const SHADOW_COLOR: &str = "#666";
const HEADER_FILL: &str = "#157DEC";
const HEADER_FILL_SELECTED: &str = "#1800AB";
const COMPARTMENT_FILL_ACTIVE: &str = "#E8F4FF";
const REQUIRE_FILL: &str = "#64E986";
const PROVIDE_FILL: &str = "#FFFFCC";
const CONNECTOR_STROKE_SELECTED: &str = "#4A8EE6";
const CONTROL_STROKE: &str = "#AAA";
const ARROW_FILL: &str = "#EEE";

const TITLE_FONT: &str = "bold 18px arial";
const LABEL_FONT: &str = "14px arial";
const PORT_FONT: &str = "10px sans-serif";
const MARKER_FONT: &str = "18px arial";

/// One drawing step of a frame, bottom first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Connector(NodeId),
    Entity(NodeId),
    /// Non-root hovered node, drawn again above its siblings.
    Hovered(NodeRef),
    /// In-progress connector from its source port to the pointer.
    TempDraw,
    Control(ControlKind),
}

/// Layer order for the next frame: visible connectors, then entities in root
/// order, then the hovered node, then the drag overlay, then the controls.
#[must_use]
pub fn frame_plan(scene: &SceneGraph) -> Vec<Layer> {
    let mut layers: Vec<Layer> = scene
        .connectors
        .iter()
        .filter(|c| scene.is_visible(c))
        .map(|c| Layer::Connector(c.id.clone()))
        .collect();
    layers.extend(scene.entities().map(|e| Layer::Entity(e.id.clone())));

    if let Some(hovered) = &scene.ui.hovered {
        let redraw = match hovered {
            NodeRef::Connector(id) => scene.connector(id).is_some_and(|c| scene.is_visible(c)),
            node => !node.is_root() && scene.resolves(node),
        };
        if redraw {
            layers.push(Layer::Hovered(hovered.clone()));
        }
    }

    let drag_visible = scene
        .ui
        .temp_draw
        .as_ref()
        .is_some_and(|drag| scene.ui.mouse.is_some() && scene.port(&drag.source_id).is_some());
    if drag_visible {
        layers.push(Layer::TempDraw);
    }

    layers.extend(scene.roots.iter().filter_map(|root| match root {
        RootNode::Move(_) => Some(Layer::Control(ControlKind::Move)),
        RootNode::Zoom(_) => Some(Layer::Control(ControlKind::Zoom)),
        RootNode::Entity(_) => None,
    }));
    layers
}

/// Draw the full scene.
///
/// `images` maps icon URLs to image elements; icons that are missing or not
/// yet loaded are skipped. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &SceneGraph,
    images: &HashMap<String, HtmlImageElement>,
    dpr: f64,
) -> Result<(), JsValue> {
    let camera = &scene.camera;
    let k = dpr * camera.scale;
    ctx.set_transform(k, 0.0, 0.0, k, -camera.pan_x * k, -camera.pan_y * k)?;
    let margin = scene.config.clear_margin;
    let extent = scene.config.clear_extent;
    ctx.clear_rect(camera.pan_x - margin, camera.pan_y - margin, extent, extent);

    for layer in frame_plan(scene) {
        match layer {
            Layer::Connector(id) => {
                if let Some(connector) = scene.connector(&id) {
                    draw_connector(ctx, scene, connector);
                }
            }
            Layer::Entity(id) => {
                if let Some(entity) = scene.entity(&id) {
                    draw_entity(ctx, scene, entity, images)?;
                }
            }
            Layer::Hovered(node) => draw_hovered(ctx, scene, &node, images)?,
            Layer::TempDraw => draw_temp_connector(ctx, scene),
            Layer::Control(kind) => draw_control(ctx, scene, kind)?,
        }
    }
    Ok(())
}

fn draw_hovered(
    ctx: &CanvasRenderingContext2d,
    scene: &SceneGraph,
    node: &NodeRef,
    images: &HashMap<String, HtmlImageElement>,
) -> Result<(), JsValue> {
    match node {
        NodeRef::Compartment(id) => {
            if let Some(view) = scene.compartment(id) {
                draw_compartment(ctx, scene, view.entity, view.compartment, view.frame, images)?;
            }
        }
        NodeRef::Port(_, id) => {
            if let Some(view) = scene.port(id) {
                draw_port(ctx, scene, &view)?;
            }
        }
        NodeRef::Connector(id) => {
            if let Some(connector) = scene.connector(id) {
                draw_connector(ctx, scene, connector);
            }
        }
        NodeRef::Entity(_) | NodeRef::Control(_) => {}
    }
    Ok(())
}

fn is_hovered(scene: &SceneGraph, node: &NodeRef) -> bool {
    scene.ui.hovered.as_ref() == Some(node)
}

fn is_selected(scene: &SceneGraph, node: &NodeRef) -> bool {
    scene.ui.selected.as_ref() == Some(node)
}

fn apply_shadow(ctx: &CanvasRenderingContext2d, blur: f64) {
    ctx.set_shadow_blur(blur);
    ctx.set_shadow_color(SHADOW_COLOR);
}

// =============================================================
// Connectors
// =============================================================

fn draw_connector(ctx: &CanvasRenderingContext2d, scene: &SceneGraph, connector: &Connector) {
    let Some((from, to)) = scene.connector_endpoints(connector) else {
        return;
    };
    let node = NodeRef::Connector(connector.id.clone());
    ctx.save();
    if is_hovered(scene, &node) {
        apply_shadow(ctx, 5.0);
    }
    let stroke = if is_selected(scene, &node) { CONNECTOR_STROKE_SELECTED } else { "#000" };
    ctx.set_stroke_style_str(stroke);
    stroke_line(ctx, from, to);
    ctx.restore();
}

fn draw_temp_connector(ctx: &CanvasRenderingContext2d, scene: &SceneGraph) {
    let (Some(drag), Some(mouse)) = (&scene.ui.temp_draw, scene.ui.mouse) else {
        return;
    };
    let Some(source) = scene.port(&drag.source_id) else {
        return;
    };
    ctx.save();
    ctx.set_stroke_style_str("#000");
    stroke_line(ctx, source.layout.connector, mouse);
    ctx.restore();
}

fn stroke_line(ctx: &CanvasRenderingContext2d, from: Point, to: Point) {
    ctx.begin_path();
    ctx.move_to(from.x, from.y);
    ctx.line_to(to.x, to.y);
    ctx.stroke();
}

// =============================================================
// Entities and compartments
// =============================================================

fn draw_entity(
    ctx: &CanvasRenderingContext2d,
    scene: &SceneGraph,
    entity: &Entity,
    images: &HashMap<String, HtmlImageElement>,
) -> Result<(), JsValue> {
    let node = NodeRef::Entity(entity.id.clone());
    let Rect { x, y, width, .. } = entity.bounds();
    let header = entity.metrics.header_height;
    let r = entity.metrics.corner_radius;

    ctx.save();
    if is_hovered(scene, &node) {
        apply_shadow(ctx, 10.0);
    }
    ctx.begin_path();
    ctx.move_to(x, y + header);
    ctx.line_to(x, y + r);
    ctx.quadratic_curve_to(x, y, x + r, y);
    ctx.line_to(x + width - r, y);
    ctx.quadratic_curve_to(x + width, y, x + width, y + r);
    ctx.line_to(x + width, y + header);
    ctx.close_path();
    let fill = if is_selected(scene, &node) { HEADER_FILL_SELECTED } else { HEADER_FILL };
    ctx.set_fill_style_str(fill);
    ctx.fill();
    ctx.set_stroke_style_str("#000");
    ctx.stroke();

    let body = entity.compartments_height();
    ctx.set_fill_style_str("#FFF");
    ctx.fill_rect(x, y + header, width, body);
    ctx.stroke_rect(x, y + header, width, body);
    ctx.restore();

    let (anchor, max_width) = entity.title_anchor();
    ctx.save();
    ctx.set_fill_style_str("#FFF");
    ctx.set_font(TITLE_FONT);
    ctx.set_text_baseline("middle");
    ctx.fill_text_with_max_width(&entity.name, anchor.x, anchor.y, max_width)?;
    ctx.restore();

    for (compartment, frame) in entity.compartment_frames() {
        draw_compartment(ctx, scene, entity, compartment, frame, images)?;
    }
    Ok(())
}

fn draw_compartment(
    ctx: &CanvasRenderingContext2d,
    scene: &SceneGraph,
    entity: &Entity,
    compartment: &Compartment,
    frame: Rect,
    images: &HashMap<String, HtmlImageElement>,
) -> Result<(), JsValue> {
    let node = NodeRef::Compartment(compartment.id.clone());
    let hovered = is_hovered(scene, &node);
    ctx.save();
    if hovered {
        apply_shadow(ctx, 10.0);
    }
    let fill = if hovered || is_selected(scene, &node) { COMPARTMENT_FILL_ACTIVE } else { "#FFF" };
    ctx.set_fill_style_str(fill);
    ctx.fill_rect(frame.x, frame.y, frame.width, frame.height);
    ctx.set_stroke_style_str("#000");
    ctx.stroke_rect(frame.x, frame.y, frame.width, frame.height);
    ctx.restore();

    let content = compartment.content(frame);
    let image = compartment
        .icon_url
        .as_ref()
        .and_then(|url| images.get(url))
        .filter(|img| img.complete() && img.natural_width() > 0);
    if let Some(image) = image {
        let icon = content.icon;
        ctx.draw_image_with_html_image_element_and_dw_and_dh(image, icon.x, icon.y, icon.width, icon.height)?;
    }

    ctx.save();
    ctx.set_fill_style_str("#000");
    ctx.set_font(LABEL_FONT);
    ctx.set_text_baseline("middle");
    ctx.fill_text_with_max_width(&compartment.name, content.label.x, content.label.y, content.label_max_width)?;
    ctx.restore();

    let row = entity.metrics.row_height;
    for kind in [PortKind::Require, PortKind::Provide] {
        for (index, port) in compartment.ports(kind).iter().enumerate() {
            let view = PortView { entity, compartment, port, layout: port.layout(frame, index, row) };
            draw_port(ctx, scene, &view)?;
        }
    }
    Ok(())
}

// =============================================================
// Ports
// =============================================================

fn draw_port(ctx: &CanvasRenderingContext2d, scene: &SceneGraph, view: &PortView<'_>) -> Result<(), JsValue> {
    let port = view.port;
    let hovered = is_hovered(scene, &NodeRef::Port(port.kind, port.id.clone()));
    let Point { x, y } = view.layout.anchor;

    ctx.save();
    ctx.set_stroke_style_str("#000");
    if hovered {
        apply_shadow(ctx, 5.0);
    }
    match port.kind {
        PortKind::Require => {
            ctx.set_fill_style_str(REQUIRE_FILL);
            ctx.begin_path();
            ctx.arc_with_anticlockwise(x, y, REQUIRE_RADIUS, PI / 2.0, 3.0 * PI / 2.0, true)?;
            ctx.close_path();
            ctx.stroke();
            ctx.fill();
        }
        PortKind::Provide => {
            ctx.set_fill_style_str(PROVIDE_FILL);
            stroke_line(ctx, Point::new(x, y), Point::new(x - PROVIDE_TAIL, y));
            let half = PROVIDE_LENGTH / 2.0;
            ctx.begin_path();
            ctx.move_to(x - PROVIDE_TAIL, y - half);
            ctx.line_to(x - PROVIDE_TAIL, y + half);
            ctx.line_to(x - PROVIDE_TAIL - PROVIDE_HYPOTENUSE, y);
            ctx.close_path();
            ctx.fill();
            ctx.stroke();
        }
    }
    ctx.restore();

    if scene.is_internally_connected(&port.id) {
        ctx.save();
        ctx.set_fill_style_str("#000");
        ctx.set_font(MARKER_FONT);
        match port.kind {
            PortKind::Require => ctx.fill_text(HIDDEN_CONNECTOR_MARKER, x, y + REQUIRE_RADIUS + 2.0)?,
            PortKind::Provide => {
                ctx.set_text_align("right");
                ctx.fill_text(HIDDEN_CONNECTOR_MARKER, x - PROVIDE_TAIL, y + PROVIDE_LENGTH / 2.0 + 2.0)?;
            }
        }
        ctx.restore();
    }

    if !port.name.is_empty() {
        ctx.save();
        ctx.set_fill_style_str("#000");
        ctx.set_font(PORT_FONT);
        ctx.set_text_baseline("bottom");
        if port.kind == PortKind::Provide {
            ctx.set_text_align("right");
        }
        ctx.fill_text(&port.name, view.layout.label.x, view.layout.label.y)?;
        ctx.restore();
    }
    Ok(())
}

// =============================================================
// Overlay controls
// =============================================================

fn draw_control(ctx: &CanvasRenderingContext2d, scene: &SceneGraph, kind: ControlKind) -> Result<(), JsValue> {
    for root in &scene.roots {
        match (root, kind) {
            (RootNode::Move(control), ControlKind::Move) => return draw_move_control(ctx, &scene.camera, control),
            (RootNode::Zoom(control), ControlKind::Zoom) => return draw_zoom_control(ctx, &scene.camera, control),
            _ => {}
        }
    }
    Ok(())
}

/// Filled disc with a thin outline, both mapped from screen into scene space.
fn control_disc(ctx: &CanvasRenderingContext2d, camera: &Camera, center: Point, radius: f64) -> Result<(), JsValue> {
    let c = camera.screen_to_world(center);
    ctx.begin_path();
    ctx.arc(c.x, c.y, camera.screen_dist_to_world(radius), 0.0, 2.0 * PI)?;
    ctx.set_fill_style_str("#FFF");
    ctx.fill();
    ctx.set_line_width(camera.screen_dist_to_world(1.0));
    ctx.set_stroke_style_str(CONTROL_STROKE);
    ctx.stroke();
    Ok(())
}

fn draw_move_control(ctx: &CanvasRenderingContext2d, camera: &Camera, control: &MoveControl) -> Result<(), JsValue> {
    ctx.save();
    control_disc(ctx, camera, control.center, control.radius)?;
    ctx.set_fill_style_str(ARROW_FILL);
    for (_, outline) in control.arrows() {
        let mut points = outline.iter().map(|p| camera.screen_to_world(*p));
        let Some(first) = points.next() else {
            continue;
        };
        ctx.begin_path();
        ctx.move_to(first.x, first.y);
        for p in points {
            ctx.line_to(p.x, p.y);
        }
        ctx.close_path();
        ctx.fill();
    }
    ctx.restore();
    Ok(())
}

fn draw_zoom_control(ctx: &CanvasRenderingContext2d, camera: &Camera, control: &ZoomControl) -> Result<(), JsValue> {
    ctx.save();
    control_disc(ctx, camera, control.center, control.radius)?;
    let c = control.center;
    let split = (Point::new(c.x - control.radius, c.y), Point::new(c.x + control.radius, c.y));
    let [horizontal, vertical] = control.plus_strokes();
    for (from, to) in [split, horizontal, vertical, control.minus_stroke()] {
        stroke_line(ctx, camera.screen_to_world(from), camera.screen_to_world(to));
    }
    ctx.restore();
    Ok(())
}
