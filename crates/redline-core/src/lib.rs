//! Redline Core Library
//!
//! Annotation data model and draw-time state machine for the Redline
//! review engine. Shapes are authored in rendered pixel space, normalized
//! to a resolution-independent unit space, and collected into an
//! [`set::AnnotationSet`] that serializes to the opaque payload embedded
//! in comments.

pub mod annotations;
pub mod builder;
pub mod geometry;
pub mod set;

pub use annotations::{Annotation, AnnotationId, AnnotationStyle, PixelShape, StrokeColor};
pub use builder::{DrawState, ShapeBuilder, ToolKind};
pub use geometry::{ContainerSize, UnitPoint, to_pixel, to_unit};
pub use set::{AnnotationSet, PayloadError};
