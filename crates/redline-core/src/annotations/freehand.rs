//! Freehand annotation.

use super::{AnnotationId, AnnotationStyle, points_bounds};
use crate::geometry::UnitPoint;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand stroke: an ordered sequence of unit-space points.
///
/// A finalized freehand always holds at least two points; anything shorter
/// is discarded by the builder before it can reach a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: AnnotationId,
    /// Points along the stroke, in draw order.
    pub points: Vec<UnitPoint>,
    /// Style properties.
    pub style: AnnotationStyle,
}

impl Freehand {
    /// Create from existing points.
    pub fn from_points(points: Vec<UnitPoint>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            style: AnnotationStyle::default(),
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// Number of points in the stroke.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unit-space bounding box.
    pub fn bounds(&self) -> Rect {
        points_bounds(&self.points)
    }
}
