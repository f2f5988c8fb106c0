//! Fixed glyph constants for the canvas crate.

// ── Ports ───────────────────────────────────────────────────────

/// Radius of the require half disc.
pub const REQUIRE_RADIUS: f64 = 12.5;

/// Base of the provide triangle.
pub const PROVIDE_LENGTH: f64 = 20.0;

/// Stem between the compartment edge and the provide triangle.
pub const PROVIDE_TAIL: f64 = 10.0;

/// Horizontal reach of the provide triangle, `sqrt(20² + 10²)`.
pub const PROVIDE_HYPOTENUSE: f64 = 22.360_679_774_997_898;

/// Label inset from a require port's anchor.
pub const REQUIRE_LABEL_INSET: f64 = 5.0;

/// Marker shown on a port with hidden internal connectors.
pub const HIDDEN_CONNECTOR_MARKER: &str = "...";

// ── Compartments ────────────────────────────────────────────────

/// Inner padding around compartment content.
pub const COMPARTMENT_INSET: f64 = 5.0;

/// Icons take at most this fraction of the compartment width.
pub const ICON_WIDTH_FRACTION: f64 = 0.2;

// ── Overlay controls (screen pixels) ────────────────────────────

pub const CONTROL_RADIUS: f64 = 30.0;
pub const MOVE_CONTROL_CENTER: (f64, f64) = (35.0, 35.0);
pub const ZOOM_CONTROL_CENTER: (f64, f64) = (35.0, 105.0);

/// Gap between the control rim and an arrow tip.
pub const ARROW_FROM_BORDER: f64 = 4.0;
/// Length of each arrow wing.
pub const ARROW_LENGTH: f64 = 10.0;
/// Thickness of each arrow wing.
pub const ARROW_THICKNESS: f64 = 3.0;
/// Depth of the notch between the wings.
pub const ARROW_NOTCH: f64 = 8.0;

pub const MOVE_CONTROL_ID: &str = "moveComponent";
pub const ZOOM_CONTROL_ID: &str = "zoomComponent";
