#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

/// Zoom-in shrinks the scene by this factor.
const ZOOM_IN_SCALE: f64 = 0.8;
/// Reciprocal of [`ZOOM_IN_SCALE`], applied to the inverse scale and the pan offset.
const ZOOM_IN_INVERSE: f64 = 1.25;

/// A point in either screen or scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A pointer position captured in both spaces.
///
/// `x` / `y` are scene coordinates (after pan and zoom). `original_x` /
/// `original_y` are the raw canvas coordinates, used by the overlay controls
/// which live in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledPoint {
    pub x: f64,
    pub y: f64,
    pub original_x: f64,
    pub original_y: f64,
}

impl ScaledPoint {
    /// Scene-space position.
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Screen-space position.
    #[must_use]
    pub fn original(&self) -> Point {
        Point::new(self.original_x, self.original_y)
    }
}

/// Direction of a discrete pan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

/// A discrete view change, requested by the overlay controls, the wheel, or
/// the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStep {
    ZoomIn,
    ZoomOut,
    Pan(PanDirection),
}

/// Pan/zoom view state.
///
/// `scale` and `invert_scale` are updated by separate multiplicative factors
/// and never derived from each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
    pub invert_scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, scale: 1.0, invert_scale: 1.0 }
    }
}

impl Camera {
    /// Map raw canvas coordinates into scene space.
    #[must_use]
    pub fn scale_point(&self, x: f64, y: f64) -> ScaledPoint {
        ScaledPoint {
            x: self.pan_x + x * self.invert_scale,
            y: self.pan_y + y * self.invert_scale,
            original_x: x,
            original_y: y,
        }
    }

    /// Convert a screen-space point to scene coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.scale_point(screen.x, screen.y).point()
    }

    /// Convert a screen-space distance to a scene-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist * self.invert_scale
    }

    /// Shrink the scene one step.
    pub fn zoom_in(&mut self) {
        self.scale *= ZOOM_IN_SCALE;
        self.invert_scale *= ZOOM_IN_INVERSE;
        self.scale_pan(ZOOM_IN_INVERSE);
    }

    /// Grow the scene one step.
    pub fn zoom_out(&mut self) {
        self.invert_scale *= ZOOM_IN_SCALE;
        self.scale *= ZOOM_IN_INVERSE;
        self.scale_pan(ZOOM_IN_SCALE);
    }

    /// Translate the view by `step` scene units.
    pub fn pan(&mut self, direction: PanDirection, step: f64) {
        match direction {
            PanDirection::Left => self.pan_x -= step,
            PanDirection::Right => self.pan_x += step,
            PanDirection::Up => self.pan_y -= step,
            PanDirection::Down => self.pan_y += step,
        }
    }

    /// Apply a discrete view change.
    pub fn apply(&mut self, step: ViewStep, pan_step: f64) {
        match step {
            ViewStep::ZoomIn => self.zoom_in(),
            ViewStep::ZoomOut => self.zoom_out(),
            ViewStep::Pan(direction) => self.pan(direction, pan_step),
        }
    }

    fn scale_pan(&mut self, factor: f64) {
        if self.pan_x != 0.0 {
            self.pan_x *= factor;
        }
        if self.pan_y != 0.0 {
            self.pan_y *= factor;
        }
    }
}
