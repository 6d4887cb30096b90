//! Draw-time state machine that turns pointer events into annotations.

use crate::annotations::{Annotation, AnnotationId, AnnotationStyle, Arrow, Freehand, Rectangle};
use crate::geometry::{ContainerSize, UnitPoint, to_unit};
use crate::set::AnnotationSet;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Freehand,
    Rectangle,
    Arrow,
}

/// State of the draw interaction.
#[derive(Debug, Clone, Default)]
pub enum DrawState {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// A shape is in progress.
    Drawing {
        /// Tool captured at pointer-down; tool switches mid-draw do not
        /// affect the in-progress shape.
        tool: ToolKind,
        /// First normalized point of the interaction.
        anchor: UnitPoint,
        /// Latest normalized pointer position.
        current: UnitPoint,
        /// Accumulated samples (freehand only).
        points: Vec<UnitPoint>,
    },
}

/// Callback invoked with the full annotation sequence after each finalize,
/// undo, or redo.
pub type ChangeListener = Box<dyn FnMut(&[Annotation])>;

/// Consumes pointer events and produces finalized annotations.
///
/// Exactly one shape may be in progress at a time; a pointer-down received
/// while already drawing is ignored. Shapes that fail the dead-click guard
/// (fewer than two freehand samples, or coincident rectangle/arrow corners)
/// are discarded without mutating the set.
pub struct ShapeBuilder {
    /// Currently selected tool.
    tool: ToolKind,
    /// Style applied to newly finalized shapes.
    style: AnnotationStyle,
    state: DrawState,
    set: AnnotationSet,
    /// Freehand sampling gate: at most one sample per animation frame.
    frame_open: bool,
    on_change: Option<ChangeListener>,
}

impl Default for ShapeBuilder {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            style: AnnotationStyle::default(),
            state: DrawState::default(),
            set: AnnotationSet::new(),
            frame_open: true,
            on_change: None,
        }
    }
}

impl ShapeBuilder {
    /// Create a builder with an empty annotation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder resuming an existing set.
    pub fn with_set(set: AnnotationSet) -> Self {
        Self {
            set,
            ..Self::default()
        }
    }

    /// Select the active tool. Does not disturb an in-progress shape.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Set the style applied to newly finalized shapes.
    pub fn set_style(&mut self, style: AnnotationStyle) {
        self.style = style;
    }

    /// Register the change listener.
    pub fn set_on_change(&mut self, listener: ChangeListener) {
        self.on_change = Some(listener);
    }

    /// Open the freehand sampling gate. Call once per animation frame.
    pub fn tick_frame(&mut self) {
        self.frame_open = true;
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    /// The annotation set this builder appends into.
    pub fn set(&self) -> &AnnotationSet {
        &self.set
    }

    /// Hand the set over (e.g. for submit serialization), leaving the
    /// builder with a fresh empty set.
    pub fn take_set(&mut self) -> AnnotationSet {
        self.cancel();
        std::mem::take(&mut self.set)
    }

    /// Begin a shape. Ignored while a shape is already in progress.
    pub fn pointer_down(&mut self, pixel: Point, container: ContainerSize) {
        if self.is_drawing() {
            log::debug!("pointer-down ignored: shape already in progress");
            return;
        }
        let anchor = to_unit(pixel, container).clamp_unit();
        let points = match self.tool {
            ToolKind::Freehand => vec![anchor],
            _ => Vec::new(),
        };
        self.frame_open = true;
        self.state = DrawState::Drawing {
            tool: self.tool,
            anchor,
            current: anchor,
            points,
        };
    }

    /// Update the in-progress shape with a new pointer position.
    pub fn pointer_move(&mut self, pixel: Point, container: ContainerSize) {
        let sample_open = self.frame_open;
        if let DrawState::Drawing {
            tool,
            current,
            points,
            ..
        } = &mut self.state
        {
            let unit = to_unit(pixel, container).clamp_unit();
            *current = unit;
            if *tool == ToolKind::Freehand && sample_open {
                if points.last() != Some(&unit) {
                    points.push(unit);
                }
                self.frame_open = false;
            }
        }
    }

    /// Finalize the in-progress shape.
    ///
    /// Returns the id of the appended annotation, or `None` when there was
    /// no shape in progress or the shape was discarded by the dead-click
    /// guard.
    pub fn pointer_up(&mut self, pixel: Point, container: ContainerSize) -> Option<AnnotationId> {
        let DrawState::Drawing {
            tool,
            anchor,
            mut points,
            ..
        } = std::mem::take(&mut self.state)
        else {
            return None;
        };

        let terminal = to_unit(pixel, container).clamp_unit();
        let annotation = match tool {
            ToolKind::Freehand => {
                if points.last() != Some(&terminal) {
                    points.push(terminal);
                }
                let mut stroke = Freehand::from_points(points);
                stroke.style = self.style.clone();
                Annotation::Freehand(stroke)
            }
            ToolKind::Rectangle => {
                let mut rect = Rectangle::from_corners(anchor, terminal);
                rect.style = self.style.clone();
                Annotation::Rectangle(rect)
            }
            ToolKind::Arrow => {
                let mut arrow = Arrow::new(anchor, terminal);
                arrow.style = self.style.clone();
                Annotation::Arrow(arrow)
            }
        };

        if annotation.is_degenerate() {
            log::debug!("discarding degenerate {:?} shape", tool);
            return None;
        }

        let id = annotation.id();
        self.set.append(annotation);
        self.notify();
        Some(id)
    }

    /// Discard the in-progress shape with no mutation to the set.
    pub fn cancel(&mut self) {
        self.state = DrawState::Idle;
    }

    /// The in-progress shape for live rendering, if any.
    pub fn preview(&self) -> Option<Annotation> {
        let DrawState::Drawing {
            tool,
            anchor,
            current,
            points,
        } = &self.state
        else {
            return None;
        };

        let annotation = match tool {
            ToolKind::Freehand => {
                if points.len() < 2 {
                    return None;
                }
                let mut stroke = Freehand::from_points(points.clone());
                stroke.style = self.style.clone();
                Annotation::Freehand(stroke)
            }
            ToolKind::Rectangle => {
                let mut rect = Rectangle::from_corners(*anchor, *current);
                rect.style = self.style.clone();
                Annotation::Rectangle(rect)
            }
            ToolKind::Arrow => {
                let mut arrow = Arrow::new(*anchor, *current);
                arrow.style = self.style.clone();
                Annotation::Arrow(arrow)
            }
        };
        Some(annotation)
    }

    /// Undo the most recent append, notifying the change listener.
    pub fn undo(&mut self) -> bool {
        let changed = self.set.undo();
        if changed {
            self.notify();
        }
        changed
    }

    /// Redo the most recently undone append, notifying the change listener.
    pub fn redo(&mut self) -> bool {
        let changed = self.set.redo();
        if changed {
            self.notify();
        }
        changed
    }

    fn notify(&mut self) {
        if let Some(listener) = self.on_change.as_mut() {
            listener(self.set.annotations());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const CONTAINER: ContainerSize = ContainerSize {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn test_rectangle_draw() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Rectangle);

        builder.pointer_down(Point::new(80.0, 60.0), CONTAINER);
        assert!(builder.is_drawing());
        builder.pointer_move(Point::new(200.0, 150.0), CONTAINER);

        let id = builder.pointer_up(Point::new(400.0, 300.0), CONTAINER);
        assert!(id.is_some());
        assert!(!builder.is_drawing());
        assert_eq!(builder.set().len(), 1);

        match &builder.set().annotations()[0] {
            Annotation::Rectangle(rect) => {
                assert!((rect.origin.x - 0.1).abs() < 1e-9);
                assert!((rect.origin.y - 0.1).abs() < 1e-9);
                assert!((rect.width - 0.4).abs() < 1e-9);
                assert!((rect.height - 0.4).abs() < 1e-9);
            }
            other => panic!("expected rectangle, got {:?}", other),
        }
    }

    #[test]
    fn test_dead_click_rectangle_discarded() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Rectangle);

        builder.pointer_down(Point::new(100.0, 100.0), CONTAINER);
        let id = builder.pointer_up(Point::new(100.0, 100.0), CONTAINER);

        assert!(id.is_none());
        assert!(builder.set().is_empty());
    }

    #[test]
    fn test_dead_click_arrow_discarded() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Arrow);

        builder.pointer_down(Point::new(250.0, 250.0), CONTAINER);
        builder.pointer_move(Point::new(250.0, 250.0), CONTAINER);
        let id = builder.pointer_up(Point::new(250.0, 250.0), CONTAINER);

        assert!(id.is_none());
        assert!(builder.set().is_empty());
    }

    #[test]
    fn test_freehand_without_drag_discarded() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Freehand);

        // Down and up at the same spot: a single sample, no stroke.
        builder.pointer_down(Point::new(100.0, 100.0), CONTAINER);
        let id = builder.pointer_up(Point::new(100.0, 100.0), CONTAINER);

        assert!(id.is_none());
        assert!(builder.set().is_empty());
    }

    #[test]
    fn test_freehand_draw_accumulates_samples() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Freehand);

        builder.pointer_down(Point::new(0.0, 0.0), CONTAINER);
        builder.tick_frame();
        builder.pointer_move(Point::new(80.0, 60.0), CONTAINER);
        builder.tick_frame();
        builder.pointer_move(Point::new(160.0, 120.0), CONTAINER);

        let id = builder.pointer_up(Point::new(240.0, 180.0), CONTAINER);
        assert!(id.is_some());

        match &builder.set().annotations()[0] {
            Annotation::Freehand(stroke) => assert_eq!(stroke.len(), 4),
            other => panic!("expected freehand, got {:?}", other),
        }
    }

    #[test]
    fn test_freehand_throttles_to_one_sample_per_frame() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Freehand);

        builder.pointer_down(Point::new(0.0, 0.0), CONTAINER);
        // Many moves within one frame: only the first is sampled.
        builder.pointer_move(Point::new(10.0, 10.0), CONTAINER);
        builder.pointer_move(Point::new(20.0, 20.0), CONTAINER);
        builder.pointer_move(Point::new(30.0, 30.0), CONTAINER);

        let id = builder.pointer_up(Point::new(400.0, 300.0), CONTAINER);
        assert!(id.is_some());

        match &builder.set().annotations()[0] {
            // anchor + one throttled sample + terminal
            Annotation::Freehand(stroke) => assert_eq!(stroke.len(), 3),
            other => panic!("expected freehand, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_discards_without_mutation() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Arrow);

        builder.pointer_down(Point::new(0.0, 0.0), CONTAINER);
        builder.pointer_move(Point::new(400.0, 300.0), CONTAINER);
        builder.cancel();

        assert!(!builder.is_drawing());
        assert!(builder.set().is_empty());

        // A pointer-up after cancel is a no-op.
        assert!(builder.pointer_up(Point::new(400.0, 300.0), CONTAINER).is_none());
    }

    #[test]
    fn test_pointer_down_while_drawing_ignored() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Rectangle);

        builder.pointer_down(Point::new(80.0, 60.0), CONTAINER);
        // Second down must not reset the anchor.
        builder.pointer_down(Point::new(700.0, 500.0), CONTAINER);

        builder.pointer_up(Point::new(400.0, 300.0), CONTAINER);
        match &builder.set().annotations()[0] {
            Annotation::Rectangle(rect) => {
                assert!((rect.origin.x - 0.1).abs() < 1e-9);
                assert!((rect.origin.y - 0.1).abs() < 1e-9);
            }
            other => panic!("expected rectangle, got {:?}", other),
        }
    }

    #[test]
    fn test_tool_captured_at_pointer_down() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Arrow);

        builder.pointer_down(Point::new(0.0, 0.0), CONTAINER);
        builder.set_tool(ToolKind::Rectangle);
        builder.pointer_up(Point::new(400.0, 300.0), CONTAINER);

        assert!(matches!(
            builder.set().annotations()[0],
            Annotation::Arrow(_)
        ));
    }

    #[test]
    fn test_on_change_receives_full_sequence() {
        let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_in_listener = seen.clone();

        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Rectangle);
        builder.set_on_change(Box::new(move |annotations| {
            seen_in_listener.borrow_mut().push(annotations.len());
        }));

        builder.pointer_down(Point::new(0.0, 0.0), CONTAINER);
        builder.pointer_up(Point::new(400.0, 300.0), CONTAINER);

        builder.pointer_down(Point::new(100.0, 100.0), CONTAINER);
        builder.pointer_up(Point::new(500.0, 400.0), CONTAINER);

        builder.undo();
        builder.redo();

        assert_eq!(*seen.borrow(), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_preview_rectangle_tracks_current() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Rectangle);
        assert!(builder.preview().is_none());

        builder.pointer_down(Point::new(0.0, 0.0), CONTAINER);
        builder.pointer_move(Point::new(400.0, 300.0), CONTAINER);

        match builder.preview() {
            Some(Annotation::Rectangle(rect)) => {
                assert!((rect.width - 0.5).abs() < 1e-9);
                assert!((rect.height - 0.5).abs() < 1e-9);
            }
            other => panic!("expected rectangle preview, got {:?}", other),
        }
    }

    #[test]
    fn test_take_set_resets_builder() {
        let mut builder = ShapeBuilder::new();
        builder.set_tool(ToolKind::Arrow);
        builder.pointer_down(Point::new(0.0, 0.0), CONTAINER);
        builder.pointer_up(Point::new(400.0, 300.0), CONTAINER);

        let set = builder.take_set();
        assert_eq!(set.len(), 1);
        assert!(builder.set().is_empty());
    }
}
