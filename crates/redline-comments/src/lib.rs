//! Redline Comments Library
//!
//! Real-time threaded comment store for the Redline review engine:
//! comment entities scoped by (project, file, version), an async backend
//! boundary, a publish/subscribe feed with deterministic ordering, and an
//! optimistic pending overlay for in-flight mutations.

pub mod backend;
pub mod comment;
pub mod pending;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{BoxFuture, CommentBackend, MemoryBackend, ReactionOpId, StoreError, StoreResult};
pub use comment::{Comment, CommentDraft, CommentId, CommentScope, feed_order, sort_feed};
pub use pending::{OpId, PendingOp, PendingOverlay};
pub use store::{CommentStore, FeedListener, SubscriptionId};
