//! Pure geometry hit primitives shared by the scene nodes.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;

/// Axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Inclusive on every edge.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }
}

/// Which half of a disc, split along the horizontal diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Upper,
    Lower,
}

/// Even-odd ray casting. Degenerate polygons (fewer than three vertices) never hit.
#[must_use]
pub fn point_in_polygon(pt: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for (i, vi) in vertices.iter().enumerate() {
        let vj = vertices[j];
        if (vi.y > pt.y) != (vj.y > pt.y) {
            let cross_x = (vj.x - vi.x) * (pt.y - vi.y) / (vj.y - vi.y) + vi.x;
            if pt.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[must_use]
pub fn point_in_circle(pt: Point, center: Point, radius: f64) -> bool {
    let dx = pt.x - center.x;
    let dy = pt.y - center.y;
    dx * dx + dy * dy <= radius * radius
}

/// Point within the given half of a disc. Points on the diameter belong to both halves.
#[must_use]
pub fn point_in_half_disc(pt: Point, center: Point, radius: f64, half: Half) -> bool {
    let on_side = match half {
        Half::Upper => pt.y <= center.y,
        Half::Lower => pt.y >= center.y,
    };
    on_side && point_in_circle(pt, center, radius)
}

/// Four corners of a band of `thickness` centred on the segment `a`-`b`.
///
/// Returns `None` for a zero-length segment, which has no direction.
#[must_use]
pub fn segment_band(a: Point, b: Point, thickness: f64) -> Option<[Point; 4]> {
    let width = b.x - a.x;
    let height = b.y - a.y;
    let length = width.hypot(height);
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    let xs = (thickness * height / length) / 2.0;
    let ys = (thickness * width / length) / 2.0;
    Some([
        Point::new(a.x - xs, a.y + ys),
        Point::new(a.x + xs, a.y - ys),
        Point::new(b.x + xs, b.y - ys),
        Point::new(b.x - xs, b.y + ys),
    ])
}

/// Point `distance` along the direction from `start` towards `end`.
///
/// Returns `start` when the two points coincide.
#[must_use]
pub fn point_along(start: Point, end: Point, distance: f64) -> Point {
    let length = (end.x - start.x).hypot(end.y - start.y);
    if length == 0.0 {
        return start;
    }
    Point::new(
        start.x + distance * (end.x - start.x) / length,
        start.y + distance * (end.y - start.y) / length,
    )
}
