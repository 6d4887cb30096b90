//! The real-time comment store: mutations plus live feed fan-out.

use crate::backend::{CommentBackend, ReactionOpId, StoreError, StoreResult};
use crate::comment::{Comment, CommentDraft, CommentId, CommentScope, sort_feed};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use uuid::Uuid;

/// Cancellation token returned from [`CommentStore::subscribe`].
pub type SubscriptionId = Uuid;

/// Callback receiving the full re-sorted feed on every change.
pub type FeedListener = Box<dyn FnMut(&[Comment])>;

struct Subscription {
    scope: CommentScope,
    listener: FeedListener,
}

/// Entity store for comments, scoped by (project, file, version).
///
/// Runs on the single cooperative thread of the engine: mutations are
/// async round-trips to the backend, and every confirmed write re-fetches
/// the scope and fans the sorted feed out to its subscribers. A failed
/// write propagates to the caller and fans out nothing.
pub struct CommentStore<B: CommentBackend> {
    backend: B,
    subscriptions: RefCell<HashMap<SubscriptionId, Subscription>>,
    /// Subscription whose listener is currently detached for delivery.
    delivering: Cell<Option<SubscriptionId>>,
    /// Set when the delivering listener cancels its own subscription.
    delivering_cancelled: Cell<bool>,
}

impl<B: CommentBackend> CommentStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            subscriptions: RefCell::new(HashMap::new()),
            delivering: Cell::new(None),
            delivering_cancelled: Cell::new(false),
        }
    }

    /// Access the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Register a listener for a scope's feed.
    ///
    /// The listener fires on every subsequent change until cancelled; call
    /// [`CommentStore::refresh`] to deliver the initial snapshot.
    pub fn subscribe(&self, scope: CommentScope, listener: FeedListener) -> SubscriptionId {
        let id = Uuid::new_v4();
        log::debug!("subscribing {id} to {scope:?}");
        self.subscriptions
            .borrow_mut()
            .insert(id, Subscription { scope, listener });
        id
    }

    /// Cancel a subscription. Takes effect immediately: the listener will
    /// not be invoked again, even by writes already in flight. Safe to
    /// call from within a listener, including on its own subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if self.subscriptions.borrow_mut().remove(&id).is_some() {
            log::debug!("cancelled subscription {id}");
        } else if self.delivering.get() == Some(id) {
            // The listener is detached for delivery right now; mark it so
            // fan-out does not reattach it afterwards.
            self.delivering_cancelled.set(true);
            log::debug!("cancelled subscription {id}");
        }
    }

    /// Fetch and fan out the current feed for a scope.
    pub async fn refresh(&self, scope: &CommentScope) -> StoreResult<()> {
        self.fan_out(scope).await
    }

    /// The current feed for a scope, sorted per the ordering contract.
    pub async fn feed(&self, scope: &CommentScope) -> StoreResult<Vec<Comment>> {
        let mut comments = self.backend.fetch_all(scope).await?;
        sort_feed(&mut comments);
        Ok(comments)
    }

    /// Create a comment (or a reply) in a scope.
    ///
    /// Replies must target an existing top-level comment: a missing parent
    /// is `NotFound`, a parent that is itself a reply is `Malformed`.
    pub async fn create(&self, scope: &CommentScope, draft: CommentDraft) -> StoreResult<Comment> {
        if let Some(parent_id) = draft.parent_id {
            let existing = self.backend.fetch_all(scope).await?;
            let parent = existing
                .iter()
                .find(|c| c.id == parent_id)
                .ok_or(StoreError::NotFound(parent_id))?;
            if !parent.is_top_level() {
                return Err(StoreError::Malformed(format!(
                    "comment {parent_id} is a reply and cannot be replied to"
                )));
            }
        }

        let comment = Comment::from_draft(draft);
        self.backend.insert(scope, comment.clone()).await?;
        self.fan_out(scope).await?;
        Ok(comment)
    }

    /// Set the resolution flag on a comment.
    pub async fn set_resolved(
        &self,
        scope: &CommentScope,
        id: CommentId,
        resolved: bool,
    ) -> StoreResult<()> {
        self.backend.set_resolved(scope, id, resolved).await?;
        self.fan_out(scope).await
    }

    /// Set the pin flag on a comment.
    pub async fn set_pinned(
        &self,
        scope: &CommentScope,
        id: CommentId,
        pinned: bool,
    ) -> StoreResult<()> {
        self.backend.set_pinned(scope, id, pinned).await?;
        self.fan_out(scope).await
    }

    /// Replace the body text of a comment.
    pub async fn edit_body(
        &self,
        scope: &CommentScope,
        id: CommentId,
        body: impl Into<String>,
    ) -> StoreResult<()> {
        self.backend.set_body(scope, id, body.into()).await?;
        self.fan_out(scope).await
    }

    /// Toggle a participant's reaction on a comment under a fresh op id.
    ///
    /// Reacting with the emoji already held removes it; any other emoji
    /// sets or replaces it (one reaction per participant per comment). The
    /// backend write carries only the resulting single-key delta. A caller
    /// that needs to retry after an ambiguous timeout must mint the op id
    /// itself and use [`CommentStore::toggle_reaction_with_op`]; retrying
    /// through this method would re-toggle.
    pub async fn toggle_reaction(
        &self,
        scope: &CommentScope,
        id: CommentId,
        participant: &str,
        emoji: &str,
    ) -> StoreResult<()> {
        self.toggle_reaction_with_op(scope, id, participant, emoji, Uuid::new_v4())
            .await
    }

    /// Toggle a participant's reaction under a caller-supplied op id.
    ///
    /// The backend treats a repeated op id as already applied, so reissuing
    /// the same call after an ambiguous timeout is safe: if the first write
    /// landed, the retry is a no-op even though the delta is recomputed
    /// from the now-toggled state.
    pub async fn toggle_reaction_with_op(
        &self,
        scope: &CommentScope,
        id: CommentId,
        participant: &str,
        emoji: &str,
        op_id: ReactionOpId,
    ) -> StoreResult<()> {
        let existing = self.backend.fetch_all(scope).await?;
        let comment = existing
            .iter()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let delta = match comment.reactions.get(participant) {
            Some(held) if held == emoji => None,
            _ => Some(emoji.to_string()),
        };

        self.backend
            .apply_reaction(scope, id, participant, delta, op_id)
            .await?;
        self.fan_out(scope).await
    }

    async fn fan_out(&self, scope: &CommentScope) -> StoreResult<()> {
        let feed = self.feed(scope).await?;
        let ids: Vec<SubscriptionId> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|(_, s)| s.scope == *scope)
            .map(|(id, _)| *id)
            .collect();

        for id in ids {
            // Detach the listener while it runs so it may call subscribe
            // or unsubscribe on this store without a registry reborrow. A
            // missing id was unsubscribed by an earlier listener this round.
            let Some(mut subscription) = self.subscriptions.borrow_mut().remove(&id) else {
                continue;
            };
            self.delivering.set(Some(id));
            self.delivering_cancelled.set(false);
            (subscription.listener)(&feed);
            self.delivering.set(None);
            if !self.delivering_cancelled.get() {
                self.subscriptions.borrow_mut().insert(id, subscription);
            }
        }
        Ok(())
    }
}
