//! Rectangle annotation.

use super::{AnnotationId, AnnotationStyle};
use crate::geometry::{ContainerSize, UnitPoint};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rectangle anchored at its draw origin.
///
/// Width and height are signed fractions of the container size, so a drag
/// up-and-left from the anchor stores negative extents. Consumers that need
/// a normalized rect use [`Rectangle::bounds`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: AnnotationId,
    /// Anchor corner (where the pointer went down).
    pub origin: UnitPoint,
    /// Signed width as a fraction of container width.
    pub width: f64,
    /// Signed height as a fraction of container height.
    pub height: f64,
    /// Style properties.
    pub style: AnnotationStyle,
}

impl Rectangle {
    /// Create a rectangle spanning two corner points.
    ///
    /// The first point becomes the anchor; extents keep their sign.
    pub fn from_corners(anchor: UnitPoint, terminal: UnitPoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin: anchor,
            width: terminal.x - anchor.x,
            height: terminal.y - anchor.y,
            style: AnnotationStyle::default(),
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// Whether the rectangle encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.width.abs() < f64::EPSILON || self.height.abs() < f64::EPSILON
    }

    /// Normalized unit-space bounding box (positive extents).
    pub fn bounds(&self) -> Rect {
        let x1 = self.origin.x + self.width;
        let y1 = self.origin.y + self.height;
        Rect::new(
            self.origin.x.min(x1),
            self.origin.y.min(y1),
            self.origin.x.max(x1),
            self.origin.y.max(y1),
        )
    }

    /// Project onto a concrete container size, in pixels.
    pub fn project(&self, container: ContainerSize) -> Rect {
        let b = self.bounds();
        Rect::new(
            b.x0 * container.width,
            b.y0 * container.height,
            b.x1 * container.width,
            b.y1 * container.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_keeps_sign() {
        let rect = Rectangle::from_corners(UnitPoint::new(0.8, 0.7), UnitPoint::new(0.2, 0.3));
        assert!((rect.width + 0.6).abs() < 1e-12);
        assert!((rect.height + 0.4).abs() < 1e-12);

        let bounds = rect.bounds();
        assert!((bounds.x0 - 0.2).abs() < 1e-12);
        assert!((bounds.y0 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate() {
        let dead = Rectangle::from_corners(UnitPoint::new(0.5, 0.5), UnitPoint::new(0.5, 0.5));
        assert!(dead.is_degenerate());

        let thin = Rectangle::from_corners(UnitPoint::new(0.1, 0.5), UnitPoint::new(0.9, 0.5));
        assert!(thin.is_degenerate());

        let real = Rectangle::from_corners(UnitPoint::new(0.1, 0.1), UnitPoint::new(0.9, 0.9));
        assert!(!real.is_degenerate());
    }
}
