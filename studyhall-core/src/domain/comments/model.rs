use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination::{CursorKeyed, CursorValue};
use crate::traits::Owned;
use crate::types::{CommentId, PostId, UserId};

pub const COMMENT_MAX_CHARS: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: CommentId,
    pub content: String,
    pub author_id: UserId,
    pub post_id: PostId,
    /// Always a top-level comment when set.
    pub parent_id: Option<CommentId>,
    /// Author of the reply this comment was originally aimed at, when it was
    /// reparented.
    pub mentioned_user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub hidden: bool,
}

impl CommentRecord {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Owned for CommentRecord {
    fn owner_id(&self) -> UserId {
        self.author_id
    }
}

impl CursorKeyed for CommentRecord {
    fn cursor_key(&self) -> CursorValue {
        self.id.into()
    }
}

/// Insert payload after thread placement has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub content: String,
    pub author_id: UserId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub mentioned_user_id: Option<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentScope {
    /// Comments attached directly to the post.
    TopLevel(PostId),
    /// Replies under one top-level comment.
    RepliesTo(CommentId),
    /// Every comment on the post, replies included.
    WholePost(PostId),
}

/// Hidden comments are excluded from listings and counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentFilter {
    pub scope: CommentScope,
}

impl CommentFilter {
    pub fn top_level(post_id: PostId) -> Self {
        Self {
            scope: CommentScope::TopLevel(post_id),
        }
    }

    pub fn replies_to(parent_id: CommentId) -> Self {
        Self {
            scope: CommentScope::RepliesTo(parent_id),
        }
    }

    pub fn whole_post(post_id: PostId) -> Self {
        Self {
            scope: CommentScope::WholePost(post_id),
        }
    }

    pub fn matches(&self, comment: &CommentRecord) -> bool {
        if comment.hidden {
            return false;
        }
        match self.scope {
            CommentScope::TopLevel(post_id) => {
                comment.post_id == post_id && comment.parent_id.is_none()
            }
            CommentScope::RepliesTo(parent_id) => comment.parent_id == Some(parent_id),
            CommentScope::WholePost(post_id) => comment.post_id == post_id,
        }
    }
}
