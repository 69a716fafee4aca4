use std::{any::type_name_of_val, fmt, sync::Arc};

use thiserror::Error;
use tracing::{info, instrument, warn};

use super::model::{COMMENT_MAX_CHARS, CommentRecord};
use super::thread::ThreadPaginationAdapter;
use super::tree::{CommentTree, DeclaredParent, Placement};
use crate::database::ports::{
    comments::{CommentsRepository, CreateCommentOutcome},
    posts::PostsRepository,
};
use crate::domain::{Actor, bounded_text};
use crate::error::{StoreError, ValidationError};
use crate::pagination::{Page, PageLimit, PaginationError};
use crate::types::{CommentId, PostId};

/// Comment creation, deletion and thread listings.
#[derive(Clone)]
pub struct CommentService<C, P>
where
    C: CommentsRepository + ?Sized,
    P: PostsRepository + ?Sized,
{
    comments: Arc<C>,
    posts: Arc<P>,
}

impl<C, P> fmt::Debug for CommentService<C, P>
where
    C: CommentsRepository + ?Sized,
    P: PostsRepository + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommentService")
            .field("comments", &type_name_of_val(self.comments.as_ref()))
            .field("posts", &type_name_of_val(self.posts.as_ref()))
            .finish()
    }
}

impl<C, P> CommentService<C, P>
where
    C: CommentsRepository + ?Sized,
    P: PostsRepository + ?Sized,
{
    pub fn new(comments: Arc<C>, posts: Arc<P>) -> Self {
        Self { comments, posts }
    }

    /// Create a comment on `post_id`, optionally replying to `parent_id`.
    ///
    /// A reply aimed at another reply is stored under that reply's top-level
    /// comment with the reply's author as the mention.
    #[instrument(skip(self, content), fields(author = %actor.user_id))]
    pub async fn create_comment(
        &self,
        actor: Actor,
        post_id: PostId,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> Result<CommentRecord, CommentError> {
        let content = bounded_text("content", content, 1, COMMENT_MAX_CHARS)?;

        match self.posts.find_by_id(post_id).await? {
            Some(post) if !post.hidden => {}
            _ => return Err(CommentError::PostNotFound(post_id)),
        }

        let parent = match parent_id {
            Some(id) => self.comments.find_by_id(id).await?,
            None => None,
        };
        let placement = CommentTree::place(
            post_id,
            DeclaredParent::from_lookup(parent_id, parent.as_ref()),
        )?;

        let new_comment = placement.into_new_comment(post_id, actor.user_id, content);
        let record = match self.comments.create(new_comment).await? {
            CreateCommentOutcome::Created(record) => record,
            CreateCommentOutcome::ParentUnavailable => {
                let declared = parent_id.or(placement.parent_id());
                warn!(?declared, %post_id, "parent comment disappeared before insert");
                return Err(match declared {
                    Some(id) => CommentError::ParentNotFound(id),
                    None => CommentError::PostNotFound(post_id),
                });
            }
            CreateCommentOutcome::PostUnavailable => {
                warn!(%post_id, "post disappeared before comment insert");
                return Err(CommentError::PostNotFound(post_id));
            }
        };

        match placement {
            Placement::Reparented {
                declared_parent_id,
                parent_id,
                mentioned_user_id,
            } => info!(
                comment_id = %record.id,
                %declared_parent_id,
                %parent_id,
                %mentioned_user_id,
                "reply reparented onto top-level comment"
            ),
            _ => info!(comment_id = %record.id, parent_id = ?record.parent_id, "comment created"),
        }
        Ok(record)
    }

    pub async fn get_comment(&self, id: CommentId) -> Result<CommentRecord, CommentError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or(CommentError::NotFound(id))
    }

    /// Delete a comment as its author or a moderator. Replies of a deleted
    /// top-level comment go with it.
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, actor: Actor, id: CommentId) -> Result<(), CommentError> {
        let comment = self.get_comment(id).await?;
        if !actor.can_manage(&comment) {
            return Err(CommentError::Forbidden);
        }

        if !self.comments.delete(id).await? {
            return Err(CommentError::NotFound(id));
        }

        info!(comment_id = %id, moderator = actor.is_moderator, "comment deleted");
        Ok(())
    }

    /// See [`ThreadPaginationAdapter::top_level_for_post`].
    pub async fn top_level_comments(
        &self,
        post_id: PostId,
        cursor: Option<CommentId>,
        limit: PageLimit,
    ) -> Result<Page<CommentRecord>, CommentError> {
        Ok(ThreadPaginationAdapter::new(self.comments.as_ref())
            .top_level_for_post(post_id, cursor, limit)
            .await?)
    }

    /// See [`ThreadPaginationAdapter::replies_for_comment`].
    pub async fn replies(
        &self,
        parent_id: CommentId,
        cursor: Option<CommentId>,
        limit: PageLimit,
    ) -> Result<Page<CommentRecord>, CommentError> {
        Ok(ThreadPaginationAdapter::new(self.comments.as_ref())
            .replies_for_comment(parent_id, cursor, limit)
            .await?)
    }
}

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("post {0} not found")]
    PostNotFound(PostId),
    #[error("parent comment {0} not found")]
    ParentNotFound(CommentId),
    #[error("parent comment {parent_id} belongs to post {parent_post_id}, not {post_id}")]
    ParentPostMismatch {
        parent_id: CommentId,
        parent_post_id: PostId,
        post_id: PostId,
    },
    #[error("comment {0} not found")]
    NotFound(CommentId),
    #[error("not allowed to modify this comment")]
    Forbidden,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<PaginationError> for CommentError {
    fn from(err: PaginationError) -> Self {
        match err {
            PaginationError::Validation(err) => CommentError::Validation(err),
            PaginationError::Store(err) => CommentError::Storage(err),
        }
    }
}
