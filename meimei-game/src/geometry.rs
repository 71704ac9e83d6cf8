//! Points and the zoom/pan transform between display and native map space.
use serde::{Deserialize, Serialize};

use crate::constants::MIN_VIEW_SCALE;

/// A position on the map.
///
/// Which space a point lives in (native image pixels or on-screen display
/// pixels) is a property of where it came from; all distance math is done on
/// native points only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Uniform scale followed by a translation, as applied to the map layer.
///
/// `display = native * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Build a transform. A scale that is not finite or not positive would make
    /// the mapping non-invertible, so it falls back to identity.
    #[must_use]
    pub fn new(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        if !scale.is_finite() || scale < MIN_VIEW_SCALE {
            log::warn!("rejecting view scale {scale}; using identity transform");
            return Self::identity();
        }
        if !offset_x.is_finite() || !offset_y.is_finite() {
            log::warn!("rejecting view offset ({offset_x}, {offset_y}); using identity transform");
            return Self::identity();
        }
        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    /// Transform that fits an image of `native_width` into `display_width`.
    #[must_use]
    pub fn fit_width(native_width: f64, display_width: f64) -> Self {
        Self::new(display_width / native_width, 0.0, 0.0)
    }

    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub const fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    #[must_use]
    pub fn to_display(&self, native: Point) -> Point {
        Point::new(
            native.x.mul_add(self.scale, self.offset_x),
            native.y.mul_add(self.scale, self.offset_y),
        )
    }

    #[must_use]
    pub fn to_native(&self, display: Point) -> Point {
        Point::new(
            (display.x - self.offset_x) / self.scale,
            (display.y - self.offset_y) / self.scale,
        )
    }
}
