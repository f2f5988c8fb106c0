//! Diagram layout and view configuration.
//!
//! The host may pass a JSON object to the widget constructor. Every field is
//! optional; missing fields fall back to the defaults below.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

const DEFAULT_ENTITY_WIDTH: f64 = 200.0;
const DEFAULT_HEADER_HEIGHT: f64 = 25.0;
const DEFAULT_ROW_HEIGHT: f64 = 50.0;
const DEFAULT_CORNER_RADIUS: f64 = 15.0;
const DEFAULT_PAN_STEP: f64 = 20.0;
const DEFAULT_CASCADE_ORIGIN_X: f64 = 80.0;
const DEFAULT_CASCADE_STEP: f64 = 40.0;
const DEFAULT_CONNECTOR_HIT_THICKNESS: f64 = 10.0;
const DEFAULT_CLEAR_MARGIN: f64 = 100.0;
const DEFAULT_CLEAR_EXTENT: f64 = 5000.0;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid diagram config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be zero or more and finite, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("corner_radius {value} exceeds {max} (header height and half the entity width)")]
    CornerTooLarge { value: f64, max: f64 },
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Width of every entity.
    pub entity_width: f64,
    /// Height of the entity title band.
    pub header_height: f64,
    /// Height of one port row inside a compartment.
    pub row_height: f64,
    /// Radius of the entity's rounded top corners.
    pub corner_radius: f64,
    /// Scene distance covered by one pan step.
    pub pan_step: f64,
    pub cascade_origin_x: f64,
    /// Offset between successively created entities, on both axes.
    pub cascade_step: f64,
    /// Width of the band around a connector that counts as a hit.
    pub connector_hit_thickness: f64,
    /// Distance the clear rectangle extends before the pan origin.
    pub clear_margin: f64,
    /// Side of the square cleared on every redraw.
    pub clear_extent: f64,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            entity_width: DEFAULT_ENTITY_WIDTH,
            header_height: DEFAULT_HEADER_HEIGHT,
            row_height: DEFAULT_ROW_HEIGHT,
            corner_radius: DEFAULT_CORNER_RADIUS,
            pan_step: DEFAULT_PAN_STEP,
            cascade_origin_x: DEFAULT_CASCADE_ORIGIN_X,
            cascade_step: DEFAULT_CASCADE_STEP,
            connector_hit_thickness: DEFAULT_CONNECTOR_HIT_THICKNESS,
            clear_margin: DEFAULT_CLEAR_MARGIN,
            clear_extent: DEFAULT_CLEAR_EXTENT,
        }
    }
}

impl DiagramConfig {
    /// Parse a JSON config object, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::NonPositive`] when a size is zero, negative or not finite.
    /// A negative `clear_margin`, a non-finite `cascade_origin_x` or a corner
    /// radius wider than the header also fail.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("entity_width", self.entity_width),
            ("header_height", self.header_height),
            ("row_height", self.row_height),
            ("corner_radius", self.corner_radius),
            ("pan_step", self.pan_step),
            ("cascade_step", self.cascade_step),
            ("connector_hit_thickness", self.connector_hit_thickness),
            ("clear_extent", self.clear_extent),
        ];
        for (field, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !(self.clear_margin.is_finite() && self.clear_margin >= 0.0) {
            return Err(ConfigError::Negative { field: "clear_margin", value: self.clear_margin });
        }
        if !self.cascade_origin_x.is_finite() {
            return Err(ConfigError::NotFinite { field: "cascade_origin_x", value: self.cascade_origin_x });
        }
        let max = self.header_height.min(self.entity_width / 2.0);
        if self.corner_radius > max {
            return Err(ConfigError::CornerTooLarge { value: self.corner_radius, max });
        }
        Ok(())
    }

    /// Position of the `n`-th created entity (1-based).
    #[must_use]
    pub fn cascade_position(&self, n: u32) -> (f64, f64) {
        let offset = f64::from(n) * self.cascade_step;
        (self.cascade_origin_x + offset, offset)
    }
}
