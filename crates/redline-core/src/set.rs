//! Annotation set with linear undo/redo and payload serialization.

use crate::annotations::Annotation;
use serde_json::Value;
use thiserror::Error;

/// Errors raised when decoding a persisted annotation payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The payload is not a JSON array at all. Individually undecodable
    /// items inside an otherwise valid array are skipped, not fatal.
    #[error("undecodable annotation payload: {0}")]
    Malformed(String),
}

/// An ordered, mutable collection of annotations for one drawing session
/// or one comment.
///
/// History is a linear stack: appending after an undo discards the forward
/// history. The set is owned exclusively by the active session; on submit
/// it is serialized to an opaque string and discarded.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    /// Live sequence, in append order.
    annotations: Vec<Annotation>,
    /// Annotations removed by undo, most recent last.
    redo_stack: Vec<Annotation>,
}

impl AnnotationSet {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized annotation, invalidating any redo history.
    pub fn append(&mut self, annotation: Annotation) {
        self.redo_stack.clear();
        self.annotations.push(annotation);
    }

    /// Remove the most recently appended annotation.
    /// Returns false at the bottom of history.
    pub fn undo(&mut self) -> bool {
        match self.annotations.pop() {
            Some(annotation) => {
                self.redo_stack.push(annotation);
                true
            }
            None => false,
        }
    }

    /// Restore the most recently undone annotation, identity included.
    /// Returns false when the redo stack is empty.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(annotation) => {
                self.annotations.push(annotation);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.annotations.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// The live annotation sequence, in append order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Serialize the live sequence to the opaque payload format
    /// (a JSON array of tagged variants). Undo history is not persisted.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.annotations)
    }

    /// Decode a persisted payload.
    ///
    /// Unknown variant tags and undecodable items are skipped so that
    /// payloads written by newer versions still render their known shapes.
    pub fn deserialize(payload: &str) -> Result<Self, PayloadError> {
        let items: Vec<Value> = serde_json::from_str(payload)
            .map_err(|e| PayloadError::Malformed(e.to_string()))?;

        let mut annotations = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<Annotation>(item) {
                Ok(annotation) => annotations.push(annotation),
                Err(e) => {
                    log::debug!("skipping unknown annotation variant: {e}");
                }
            }
        }

        Ok(Self {
            annotations,
            redo_stack: Vec::new(),
        })
    }
}
