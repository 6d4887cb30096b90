//! Annotation definitions for review markup.

mod arrow;
mod freehand;
mod rectangle;

pub use arrow::Arrow;
pub use freehand::Freehand;
pub use rectangle::Rectangle;

use crate::geometry::{ContainerSize, UnitPoint, to_pixel};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable stroke color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl StrokeColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

/// Style properties shared by all annotation variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStyle {
    /// Stroke color.
    pub color: StrokeColor,
    /// Stroke width in pixels at the authoring resolution.
    pub stroke_width: f64,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            color: StrokeColor::black(),
            stroke_width: 2.0,
        }
    }
}

/// Unique identifier for annotations, stable within the owning set.
pub type AnnotationId = Uuid;

/// Pixel-space geometry produced by projecting an annotation onto a
/// concrete container size. This is the hand-off shape for the external
/// rendering adapter; it is never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelShape {
    /// Connected polyline of pixel points.
    Polyline(Vec<Point>),
    /// Axis-aligned rectangle in pixels.
    Rect(Rect),
    /// Directed segment from tail to head.
    Arrow { start: Point, end: Point },
}

/// Enum wrapper over the three annotation variants (for serialization).
///
/// Annotations are immutable once finalized; editing one means retracting
/// it and appending a replacement carrying a fresh identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    Freehand(Freehand),
    Rectangle(Rectangle),
    Arrow(Arrow),
}

impl Annotation {
    pub fn id(&self) -> AnnotationId {
        match self {
            Annotation::Freehand(a) => a.id,
            Annotation::Rectangle(a) => a.id,
            Annotation::Arrow(a) => a.id,
        }
    }

    pub fn style(&self) -> &AnnotationStyle {
        match self {
            Annotation::Freehand(a) => &a.style,
            Annotation::Rectangle(a) => &a.style,
            Annotation::Arrow(a) => &a.style,
        }
    }

    /// Bounding box in unit coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            Annotation::Freehand(a) => a.bounds(),
            Annotation::Rectangle(a) => a.bounds(),
            Annotation::Arrow(a) => a.bounds(),
        }
    }

    /// Whether this shape has no drawable extent (dead-click guard input).
    pub fn is_degenerate(&self) -> bool {
        match self {
            Annotation::Freehand(a) => a.points.len() < 2,
            Annotation::Rectangle(a) => a.is_degenerate(),
            Annotation::Arrow(a) => a.is_degenerate(),
        }
    }

    /// Project unit-space geometry onto a concrete container size.
    pub fn project(&self, container: ContainerSize) -> PixelShape {
        match self {
            Annotation::Freehand(a) => PixelShape::Polyline(
                a.points.iter().map(|&p| to_pixel(p, container)).collect(),
            ),
            Annotation::Rectangle(a) => PixelShape::Rect(a.project(container)),
            Annotation::Arrow(a) => PixelShape::Arrow {
                start: to_pixel(a.start, container),
                end: to_pixel(a.end, container),
            },
        }
    }

    /// Return a copy carrying a fresh identifier.
    ///
    /// Used by retract-and-reappend editing so the replacement never
    /// aliases the retracted annotation.
    pub fn with_new_id(&self) -> Self {
        let mut copy = self.clone();
        let new_id = Uuid::new_v4();
        match &mut copy {
            Annotation::Freehand(a) => a.id = new_id,
            Annotation::Rectangle(a) => a.id = new_id,
            Annotation::Arrow(a) => a.id = new_id,
        }
        copy
    }
}

/// Unit-space bounding box of a point sequence.
pub(crate) fn points_bounds(points: &[UnitPoint]) -> Rect {
    if points.is_empty() {
        return Rect::ZERO;
    }
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect::new(min_x, min_y, max_x, max_y)
}
