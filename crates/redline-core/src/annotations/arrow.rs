//! Arrow annotation.

use super::{AnnotationId, AnnotationStyle, points_bounds};
use crate::geometry::UnitPoint;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An arrow from a tail point to a head point, both in unit space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: AnnotationId,
    /// Tail of the arrow.
    pub start: UnitPoint,
    /// Head of the arrow (where it points).
    pub end: UnitPoint,
    /// Style properties.
    pub style: AnnotationStyle,
}

impl Arrow {
    pub fn new(start: UnitPoint, end: UnitPoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: AnnotationStyle::default(),
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// Shaft length in unit space.
    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether tail and head coincide.
    pub fn is_degenerate(&self) -> bool {
        self.length() < f64::EPSILON
    }

    /// Unit-space bounding box.
    pub fn bounds(&self) -> Rect {
        points_bounds(&[self.start, self.end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        let arrow = Arrow::new(UnitPoint::new(0.0, 0.0), UnitPoint::new(0.3, 0.4));
        assert!((arrow.length() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate() {
        let dead = Arrow::new(UnitPoint::new(0.5, 0.5), UnitPoint::new(0.5, 0.5));
        assert!(dead.is_degenerate());

        let real = Arrow::new(UnitPoint::new(0.1, 0.1), UnitPoint::new(0.2, 0.2));
        assert!(!real.is_degenerate());
    }
}
