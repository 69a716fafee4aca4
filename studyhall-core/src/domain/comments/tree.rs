use super::model::{CommentRecord, NewComment};
use super::service::CommentError;
use crate::types::{CommentId, PostId, UserId};

/// What the store returned for the parent a client declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredParent<'a> {
    None,
    Missing(CommentId),
    Found(&'a CommentRecord),
}

impl<'a> DeclaredParent<'a> {
    pub fn from_lookup(declared: Option<CommentId>, found: Option<&'a CommentRecord>) -> Self {
        match (declared, found) {
            (None, _) => DeclaredParent::None,
            (Some(_), Some(parent)) => DeclaredParent::Found(parent),
            (Some(id), None) => DeclaredParent::Missing(id),
        }
    }
}

/// Where a new comment lands in its thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// No parent declared.
    TopLevel,
    /// Declared parent is top-level; stored as given.
    Reply { parent_id: CommentId },
    /// Declared parent is itself a reply; moved up to that reply's
    /// top-level comment.
    Reparented {
        declared_parent_id: CommentId,
        parent_id: CommentId,
        mentioned_user_id: UserId,
    },
}

impl Placement {
    pub fn parent_id(&self) -> Option<CommentId> {
        match self {
            Placement::TopLevel => None,
            Placement::Reply { parent_id } | Placement::Reparented { parent_id, .. } => {
                Some(*parent_id)
            }
        }
    }

    pub fn mentioned_user_id(&self) -> Option<UserId> {
        match self {
            Placement::Reparented {
                mentioned_user_id, ..
            } => Some(*mentioned_user_id),
            _ => None,
        }
    }

    pub fn into_new_comment(
        self,
        post_id: PostId,
        author_id: UserId,
        content: String,
    ) -> NewComment {
        NewComment {
            content,
            author_id,
            post_id,
            parent_id: self.parent_id(),
            mentioned_user_id: self.mentioned_user_id(),
        }
    }
}

/// Final parent and mention for a reply to `declared`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedParent {
    pub parent_id: CommentId,
    pub mentioned_user_id: Option<UserId>,
}

/// Collapses reply chains to depth two. Pure; one hop is always enough
/// because a stored parent is never itself a reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyMentionResolver;

impl ReplyMentionResolver {
    pub fn resolve(declared: &CommentRecord) -> ResolvedParent {
        match declared.parent_id {
            None => ResolvedParent {
                parent_id: declared.id,
                mentioned_user_id: None,
            },
            Some(top_level) => ResolvedParent {
                parent_id: top_level,
                mentioned_user_id: Some(declared.author_id),
            },
        }
    }
}

/// Placement rules applied before a comment is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentTree;

impl CommentTree {
    /// Check the declared parent against the target post and decide the
    /// placement. The post itself must already be known to exist.
    pub fn place(post_id: PostId, declared: DeclaredParent<'_>) -> Result<Placement, CommentError> {
        let parent = match declared {
            DeclaredParent::None => return Ok(Placement::TopLevel),
            DeclaredParent::Missing(id) => return Err(CommentError::ParentNotFound(id)),
            DeclaredParent::Found(parent) => parent,
        };

        if parent.post_id != post_id {
            return Err(CommentError::ParentPostMismatch {
                parent_id: parent.id,
                parent_post_id: parent.post_id,
                post_id,
            });
        }

        let resolved = ReplyMentionResolver::resolve(parent);
        Ok(match resolved.mentioned_user_id {
            None => Placement::Reply {
                parent_id: resolved.parent_id,
            },
            Some(mentioned_user_id) => Placement::Reparented {
                declared_parent_id: parent.id,
                parent_id: resolved.parent_id,
                mentioned_user_id,
            },
        })
    }
}
