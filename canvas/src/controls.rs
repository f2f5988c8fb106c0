//! Fixed overlay controls for panning and zooming.
//!
//! Both controls are defined in screen space and hit-tested against the raw
//! pointer coordinates, so they stay anchored to the top-left corner however
//! the scene is panned or zoomed. The renderer maps their geometry back into
//! scene space each frame.

#[cfg(test)]
#[path = "controls_test.rs"]
mod controls_test;

use crate::camera::{PanDirection, Point, ScaledPoint, ViewStep};
use crate::consts::{
    ARROW_FROM_BORDER, ARROW_LENGTH, ARROW_NOTCH, ARROW_THICKNESS, CONTROL_RADIUS, MOVE_CONTROL_CENTER,
    ZOOM_CONTROL_CENTER,
};
use crate::hit::{self, Half};
use crate::node::{Clickable, ControlKind, NodeRef, Selectable};
use crate::scene::SceneGraph;

// =============================================================
// Move control
// =============================================================

/// Disc with four arrows; each arrow pans one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveControl {
    pub center: Point,
    pub radius: f64,
}

impl Default for MoveControl {
    fn default() -> Self {
        Self { center: Point::new(MOVE_CONTROL_CENTER.0, MOVE_CONTROL_CENTER.1), radius: CONTROL_RADIUS }
    }
}

impl MoveControl {
    /// Arrow outlines in screen space, one per pan direction.
    #[must_use]
    pub fn arrows(&self) -> [(PanDirection, Vec<Point>); 4] {
        let (cx, cy) = (self.center.x, self.center.y);
        let reach = self.radius - ARROW_FROM_BORDER;
        let left = Point::new(cx - reach, cy);
        let right = Point::new(cx + reach, cy);
        let up = Point::new(cx, cy - reach);
        let down = Point::new(cx, cy + reach);
        [
            (PanDirection::Left, arrow(left, up, down, right)),
            (PanDirection::Up, arrow(up, right, left, down)),
            (PanDirection::Right, arrow(right, down, up, left)),
            (PanDirection::Down, arrow(down, left, right, up)),
        ]
    }
}

/// Chevron with its tip at `tip`, wings pointing at `wing_a` and `wing_b`,
/// and its notch cut towards `back`.
fn arrow(tip: Point, wing_a: Point, wing_b: Point, back: Point) -> Vec<Point> {
    let end_a = hit::point_along(tip, wing_a, ARROW_LENGTH);
    let end_b = hit::point_along(tip, wing_b, ARROW_LENGTH);
    let notch = hit::point_along(tip, back, ARROW_NOTCH);
    let (Some(a), Some(b)) = (
        hit::segment_band(tip, end_a, ARROW_THICKNESS),
        hit::segment_band(tip, end_b, ARROW_THICKNESS),
    ) else {
        return Vec::new();
    };
    vec![a[1], a[2], a[3], notch, b[2], b[3], b[0]]
}

impl Selectable for MoveControl {
    fn hit_test(&self, _scene: &SceneGraph, point: &ScaledPoint) -> Option<NodeRef> {
        hit::point_in_circle(point.original(), self.center, self.radius).then_some(NodeRef::Control(ControlKind::Move))
    }
}

impl Clickable for MoveControl {
    fn click(&self, point: &ScaledPoint) -> Option<ViewStep> {
        let screen = point.original();
        self.arrows()
            .into_iter()
            .find(|(_, outline)| hit::point_in_polygon(screen, outline))
            .map(|(direction, _)| ViewStep::Pan(direction))
    }
}

// =============================================================
// Zoom control
// =============================================================

/// Disc split horizontally: the upper half (plus glyph) grows the scene, the
/// lower half (minus glyph) shrinks it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomControl {
    pub center: Point,
    pub radius: f64,
}

impl Default for ZoomControl {
    fn default() -> Self {
        Self { center: Point::new(ZOOM_CONTROL_CENTER.0, ZOOM_CONTROL_CENTER.1), radius: CONTROL_RADIUS }
    }
}

impl ZoomControl {
    fn sign_radius(&self) -> f64 {
        self.radius / 4.0
    }

    /// Horizontal and vertical strokes of the plus glyph.
    #[must_use]
    pub fn plus_strokes(&self) -> [(Point, Point); 2] {
        let c = Point::new(self.center.x, self.center.y - self.radius / 2.0);
        let s = self.sign_radius();
        [
            (Point::new(c.x - s, c.y), Point::new(c.x + s, c.y)),
            (Point::new(c.x, c.y - s), Point::new(c.x, c.y + s)),
        ]
    }

    #[must_use]
    pub fn minus_stroke(&self) -> (Point, Point) {
        let c = Point::new(self.center.x, self.center.y + self.radius / 2.0);
        let s = self.sign_radius();
        (Point::new(c.x - s, c.y), Point::new(c.x + s, c.y))
    }
}

impl Selectable for ZoomControl {
    fn hit_test(&self, _scene: &SceneGraph, point: &ScaledPoint) -> Option<NodeRef> {
        hit::point_in_circle(point.original(), self.center, self.radius).then_some(NodeRef::Control(ControlKind::Zoom))
    }
}

impl Clickable for ZoomControl {
    fn click(&self, point: &ScaledPoint) -> Option<ViewStep> {
        let screen = point.original();
        if hit::point_in_half_disc(screen, self.center, self.radius, Half::Lower) {
            Some(ViewStep::ZoomIn)
        } else if hit::point_in_half_disc(screen, self.center, self.radius, Half::Upper) {
            Some(ViewStep::ZoomOut)
        } else {
            None
        }
    }
}
