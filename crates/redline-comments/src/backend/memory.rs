//! In-memory backend implementation.

use super::{BoxFuture, CommentBackend, ReactionOpId, StoreError, StoreResult};
use crate::comment::{Comment, CommentId, CommentScope};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory backend for tests and offline sessions.
///
/// Also models connection loss: flipping [`MemoryBackend::set_available`]
/// to false makes every call fail with `Unavailable`, which is how the
/// store's failure semantics are exercised without a network.
pub struct MemoryBackend {
    scopes: RwLock<HashMap<CommentScope, HashMap<CommentId, Comment>>>,
    applied_ops: RwLock<HashSet<ReactionOpId>>,
    available: AtomicBool,
}

impl MemoryBackend {
    /// Create a new empty backend, initially available.
    pub fn new() -> Self {
        Self {
            scopes: RwLock::new(HashMap::new()),
            applied_ops: RwLock::new(HashSet::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the connection going down (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("backend offline".to_string()))
        }
    }

    fn with_comment<R>(
        &self,
        scope: &CommentScope,
        id: CommentId,
        mutate: impl FnOnce(&mut Comment) -> R,
    ) -> StoreResult<R> {
        let mut scopes = self
            .scopes
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock error: {e}")))?;
        let comment = scopes
            .get_mut(scope)
            .and_then(|comments| comments.get_mut(&id))
            .ok_or(StoreError::NotFound(id))?;
        Ok(mutate(comment))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentBackend for MemoryBackend {
    fn insert(&self, scope: &CommentScope, comment: Comment) -> BoxFuture<'_, StoreResult<()>> {
        let scope = scope.clone();
        Box::pin(async move {
            self.check_available()?;
            let mut scopes = self
                .scopes
                .write()
                .map_err(|e| StoreError::Unavailable(format!("lock error: {e}")))?;
            scopes.entry(scope).or_default().insert(comment.id, comment);
            Ok(())
        })
    }

    fn fetch_all(&self, scope: &CommentScope) -> BoxFuture<'_, StoreResult<Vec<Comment>>> {
        let scope = scope.clone();
        Box::pin(async move {
            self.check_available()?;
            let scopes = self
                .scopes
                .read()
                .map_err(|e| StoreError::Unavailable(format!("lock error: {e}")))?;
            Ok(scopes
                .get(&scope)
                .map(|comments| comments.values().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn set_resolved(
        &self,
        scope: &CommentScope,
        id: CommentId,
        resolved: bool,
    ) -> BoxFuture<'_, StoreResult<()>> {
        let scope = scope.clone();
        Box::pin(async move {
            self.check_available()?;
            self.with_comment(&scope, id, |c| c.is_resolved = resolved)
        })
    }

    fn set_pinned(
        &self,
        scope: &CommentScope,
        id: CommentId,
        pinned: bool,
    ) -> BoxFuture<'_, StoreResult<()>> {
        let scope = scope.clone();
        Box::pin(async move {
            self.check_available()?;
            self.with_comment(&scope, id, |c| c.is_pinned = pinned)
        })
    }

    fn set_body(
        &self,
        scope: &CommentScope,
        id: CommentId,
        body: String,
    ) -> BoxFuture<'_, StoreResult<()>> {
        let scope = scope.clone();
        Box::pin(async move {
            self.check_available()?;
            self.with_comment(&scope, id, |c| c.body = body)
        })
    }

    fn apply_reaction(
        &self,
        scope: &CommentScope,
        id: CommentId,
        participant: &str,
        emoji: Option<String>,
        op_id: ReactionOpId,
    ) -> BoxFuture<'_, StoreResult<()>> {
        let scope = scope.clone();
        let participant = participant.to_string();
        Box::pin(async move {
            self.check_available()?;
            {
                let applied = self
                    .applied_ops
                    .read()
                    .map_err(|e| StoreError::Unavailable(format!("lock error: {e}")))?;
                if applied.contains(&op_id) {
                    // Retried delivery of an already-applied toggle.
                    return Ok(());
                }
            }
            self.with_comment(&scope, id, |c| match emoji {
                Some(emoji) => {
                    c.reactions.insert(participant, emoji);
                }
                None => {
                    c.reactions.remove(&participant);
                }
            })?;
            self.applied_ops
                .write()
                .map_err(|e| StoreError::Unavailable(format!("lock error: {e}")))?
                .insert(op_id);
            Ok(())
        })
    }
}
