//! Optimistic pending overlay for comment mutations.
//!
//! The UI reflects a mutation immediately by staging it here, while the
//! store's round-trip is in flight. The overlay merges staged ops on top
//! of the confirmed feed; on completion the caller either confirms the op
//! (the confirmed feed now carries it) or reverts it (the round-trip
//! failed). Confirmed state is never mutated in place.

use crate::comment::{Comment, CommentId, sort_feed};
use uuid::Uuid;

/// Identifier for one staged operation.
pub type OpId = Uuid;

/// A staged mutation mirroring the store's write operations.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingOp {
    /// A comment created locally, not yet confirmed.
    Create(Comment),
    SetResolved { id: CommentId, resolved: bool },
    SetPinned { id: CommentId, pinned: bool },
    EditBody { id: CommentId, body: String },
    /// `Some(emoji)` sets or replaces the participant's reaction,
    /// `None` removes it. The caller computes the toggle target.
    React {
        id: CommentId,
        participant: String,
        emoji: Option<String>,
    },
}

/// Local staging layer merged over the confirmed feed.
#[derive(Debug, Default)]
pub struct PendingOverlay {
    ops: Vec<(OpId, PendingOp)>,
}

impl PendingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Stage an operation, returning its id for later confirm/revert.
    pub fn stage(&mut self, op: PendingOp) -> OpId {
        let id = Uuid::new_v4();
        self.ops.push((id, op));
        id
    }

    /// Drop a staged op after its round-trip confirmed. The confirmed
    /// feed now carries the change.
    pub fn confirm(&mut self, op: OpId) {
        self.settle(op);
    }

    /// Drop a staged op after its round-trip failed, rolling the
    /// optimistic state back.
    pub fn revert(&mut self, op: OpId) {
        self.settle(op);
    }

    fn settle(&mut self, op: OpId) {
        self.ops.retain(|(id, _)| *id != op);
    }

    /// The confirmed feed with staged ops applied on top, re-sorted with
    /// the feed ordering.
    pub fn merge(&self, confirmed: &[Comment]) -> Vec<Comment> {
        let mut feed: Vec<Comment> = confirmed.to_vec();

        for (_, op) in &self.ops {
            match op {
                PendingOp::Create(comment) => {
                    // The confirmed feed may already carry it if the write
                    // landed before the caller confirmed the op.
                    if !feed.iter().any(|c| c.id == comment.id) {
                        feed.push(comment.clone());
                    }
                }
                PendingOp::SetResolved { id, resolved } => {
                    if let Some(c) = feed.iter_mut().find(|c| c.id == *id) {
                        c.is_resolved = *resolved;
                    }
                }
                PendingOp::SetPinned { id, pinned } => {
                    if let Some(c) = feed.iter_mut().find(|c| c.id == *id) {
                        c.is_pinned = *pinned;
                    }
                }
                PendingOp::EditBody { id, body } => {
                    if let Some(c) = feed.iter_mut().find(|c| c.id == *id) {
                        c.body = body.clone();
                    }
                }
                PendingOp::React {
                    id,
                    participant,
                    emoji,
                } => {
                    if let Some(c) = feed.iter_mut().find(|c| c.id == *id) {
                        match emoji {
                            Some(emoji) => {
                                c.reactions.insert(participant.clone(), emoji.clone());
                            }
                            None => {
                                c.reactions.remove(participant);
                            }
                        }
                    }
                }
            }
        }

        sort_feed(&mut feed);
        feed
    }
}
