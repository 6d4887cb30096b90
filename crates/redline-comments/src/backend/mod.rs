//! Backend abstraction for the real-time comment store.

mod memory;

pub use memory::MemoryBackend;

use crate::comment::{Comment, CommentId, CommentScope};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Store errors surfaced to the caller of the triggering action.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying connection is unavailable; the caller may retry.
    #[error("comment store unavailable: {0}")]
    Unavailable(String),
    /// The mutation target no longer exists; the mutation is abandoned.
    #[error("comment not found: {0}")]
    NotFound(CommentId),
    /// The request itself is invalid (e.g. a reply targeting a reply).
    #[error("malformed request: {0}")]
    Malformed(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async round-trips to the backend.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Identifier for one reaction write, generated client-side.
///
/// Backends treat a repeated op id as already applied, which makes
/// reaction toggles safe to retry after an ambiguous timeout.
pub type ReactionOpId = Uuid;

/// Trait for comment persistence backends.
///
/// Implementations wrap the external real-time store; [`MemoryBackend`]
/// is the in-process reference used by tests and offline sessions.
pub trait CommentBackend: Send + Sync {
    /// Insert a new comment into a scope.
    fn insert(&self, scope: &CommentScope, comment: Comment) -> BoxFuture<'_, StoreResult<()>>;

    /// Fetch every comment in a scope, unordered.
    fn fetch_all(&self, scope: &CommentScope) -> BoxFuture<'_, StoreResult<Vec<Comment>>>;

    /// Set the resolution flag on a comment.
    fn set_resolved(
        &self,
        scope: &CommentScope,
        id: CommentId,
        resolved: bool,
    ) -> BoxFuture<'_, StoreResult<()>>;

    /// Set the pin flag on a comment.
    fn set_pinned(
        &self,
        scope: &CommentScope,
        id: CommentId,
        pinned: bool,
    ) -> BoxFuture<'_, StoreResult<()>>;

    /// Replace the body text of a comment.
    fn set_body(
        &self,
        scope: &CommentScope,
        id: CommentId,
        body: String,
    ) -> BoxFuture<'_, StoreResult<()>>;

    /// Write one participant's reaction key: `Some(emoji)` sets or
    /// replaces it, `None` removes it. Only the single key is touched so
    /// concurrent reactions from other participants are never lost.
    fn apply_reaction(
        &self,
        scope: &CommentScope,
        id: CommentId,
        participant: &str,
        emoji: Option<String>,
        op_id: ReactionOpId,
    ) -> BoxFuture<'_, StoreResult<()>>;
}
