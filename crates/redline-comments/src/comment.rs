//! Comment entity and feed ordering.

use chrono::{DateTime, Utc};
use redline_core::{AnnotationSet, PayloadError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for comments.
pub type CommentId = Uuid;

/// The (project, file, version) key identifying one comment feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentScope {
    pub project_id: String,
    pub file_id: String,
    pub version: u32,
}

impl CommentScope {
    pub fn new(project_id: impl Into<String>, file_id: impl Into<String>, version: u32) -> Self {
        Self {
            project_id: project_id.into(),
            file_id: file_id.into(),
            version,
        }
    }
}

/// A comment on a file version.
///
/// Comments follow a soft lifecycle: they are mutated in place for
/// resolve/pin/react/edit and never physically deleted by this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    /// Author display name, already resolved by the collaborator layer.
    pub author: String,
    pub body: String,
    /// Position in time-based media, in seconds.
    pub media_timestamp: Option<f64>,
    /// Top-level comment this replies to. One level of threading only;
    /// a reply never references another reply.
    pub parent_id: Option<CommentId>,
    pub is_resolved: bool,
    pub is_pinned: bool,
    /// Participant identifier to their single emoji reaction.
    pub reactions: BTreeMap<String, String>,
    /// Opaque serialized annotation payload, if the comment carries markup.
    pub annotations: Option<String>,
    /// Server-assigned creation instant.
    pub created_at: DateTime<Utc>,
}

/// The fields a caller supplies when creating a comment.
#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub author: String,
    pub body: String,
    pub media_timestamp: Option<f64>,
    pub parent_id: Option<CommentId>,
    pub annotations: Option<String>,
}

impl CommentDraft {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Anchor the comment to a position in time-based media.
    pub fn at_timestamp(mut self, seconds: f64) -> Self {
        self.media_timestamp = Some(seconds);
        self
    }

    /// Make this a reply to a top-level comment.
    pub fn replying_to(mut self, parent: CommentId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Attach a serialized annotation payload.
    pub fn with_annotations(mut self, payload: impl Into<String>) -> Self {
        self.annotations = Some(payload.into());
        self
    }
}

impl Comment {
    /// Materialize a draft: fresh id, creation instant now, unpinned,
    /// unresolved, no reactions.
    pub fn from_draft(draft: CommentDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: draft.author,
            body: draft.body,
            media_timestamp: draft.media_timestamp,
            parent_id: draft.parent_id,
            is_resolved: false,
            is_pinned: false,
            reactions: BTreeMap::new(),
            annotations: draft.annotations,
            created_at: Utc::now(),
        }
    }

    /// Whether this is a top-level comment (not a reply).
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Decode the embedded annotation payload, if the comment carries one.
    ///
    /// Individually undecodable shapes inside the payload are skipped by
    /// the decoder; only a payload that is not an annotation array at all
    /// yields an error, which callers treat as "no markup" for this item
    /// without failing the rest of the feed.
    pub fn annotation_set(&self) -> Option<Result<AnnotationSet, PayloadError>> {
        self.annotations.as_deref().map(AnnotationSet::deserialize)
    }
}

/// Feed ordering: pinned comments first, then newest-created first.
///
/// Ties on the creation instant break by id so the order is deterministic
/// across re-renders. UI lists must not re-sort independently.
pub fn feed_order(a: &Comment, b: &Comment) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Sort a feed in place with [`feed_order`].
pub fn sort_feed(comments: &mut [Comment]) {
    comments.sort_by(feed_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn comment_at(pinned: bool, secs: i64) -> Comment {
        let mut c = Comment::from_draft(CommentDraft::new("reviewer", "body"));
        c.is_pinned = pinned;
        c.created_at = Utc.timestamp_opt(secs, 0).unwrap();
        c
    }

    #[test]
    fn test_pinned_before_unpinned_regardless_of_age() {
        let older_pinned = comment_at(true, 100);
        let newer_unpinned = comment_at(false, 200);

        let mut feed = vec![newer_unpinned.clone(), older_pinned.clone()];
        sort_feed(&mut feed);
        assert_eq!(feed[0].id, older_pinned.id);
        assert_eq!(feed[1].id, newer_unpinned.id);

        // Insertion order does not matter.
        let mut feed = vec![older_pinned.clone(), newer_unpinned.clone()];
        sort_feed(&mut feed);
        assert_eq!(feed[0].id, older_pinned.id);
    }

    #[test]
    fn test_newest_first_within_partition() {
        let old = comment_at(false, 100);
        let new = comment_at(false, 200);

        let mut feed = vec![old.clone(), new.clone()];
        sort_feed(&mut feed);
        assert_eq!(feed[0].id, new.id);
        assert_eq!(feed[1].id, old.id);
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let a = comment_at(false, 100);
        let b = comment_at(false, 100);

        let mut first = vec![a.clone(), b.clone()];
        let mut second = vec![b, a];
        sort_feed(&mut first);
        sort_feed(&mut second);

        let first_ids: Vec<_> = first.iter().map(|c| c.id).collect();
        let second_ids: Vec<_> = second.iter().map(|c| c.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn test_draft_defaults() {
        let c = Comment::from_draft(
            CommentDraft::new("ana", "looks off")
                .at_timestamp(12.5)
                .with_annotations("[]"),
        );
        assert!(!c.is_pinned);
        assert!(!c.is_resolved);
        assert!(c.reactions.is_empty());
        assert!(c.is_top_level());
        assert_eq!(c.media_timestamp, Some(12.5));
        assert_eq!(c.annotations.as_deref(), Some("[]"));
    }
}
