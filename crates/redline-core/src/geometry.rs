//! Coordinate normalization between rendered pixel space and unit space.
//!
//! Annotations are authored against whatever size the media happens to be
//! rendered at, but they are stored in a resolution-independent unit space
//! so they stay spatially correct when the viewer's window is resized or
//! the file is opened on a different device.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A point in unit space.
///
/// Both axes range over [0, 1], where (0, 0) is the top-left of the media's
/// intrinsic render area and (1, 1) is the bottom-right. Pixel coordinates
/// never persist; this is the only point type that crosses the storage
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPoint {
    pub x: f64,
    pub y: f64,
}

impl UnitPoint {
    /// Create a unit point without range checking.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a unit point clamped into [0, 1] on both axes.
    ///
    /// Pointer positions reported slightly outside the render area (e.g.
    /// a drag that leaves the player) stay legal this way.
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }

    /// Clamp this point into [0, 1] on both axes.
    pub fn clamp_unit(self) -> Self {
        Self::clamped(self.x, self.y)
    }
}

/// The rendered size of the media container in pixels.
///
/// Delivered by the layout/render layer on every resize; the engine never
/// caches pixel geometry beyond the current event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Ratio of a pixel value to a container dimension.
///
/// A dimension that is zero or negative (collapsed layout, hidden player)
/// yields 0 rather than NaN/infinity so callers never have to handle a
/// failure case.
fn ratio(value: f64, dimension: f64) -> f64 {
    if dimension <= 0.0 { 0.0 } else { value / dimension }
}

/// Convert a pixel-space point to unit space.
pub fn to_unit(pixel: Point, container: ContainerSize) -> UnitPoint {
    UnitPoint::new(
        ratio(pixel.x, container.width),
        ratio(pixel.y, container.height),
    )
}

/// Project a unit-space point back to pixel space for the given container.
pub fn to_pixel(unit: UnitPoint, container: ContainerSize) -> Point {
    Point::new(unit.x * container.width, unit.y * container.height)
}
