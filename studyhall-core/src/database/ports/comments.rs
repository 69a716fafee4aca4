use async_trait::async_trait;

use crate::domain::comments::{CommentFilter, CommentRecord, NewComment};
use crate::error::Result;
use crate::pagination::{CursorValue, KeysetSource};
use crate::types::CommentId;

/// Result of an insert that re-checks its parent in the same atomic step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateCommentOutcome {
    Created(CommentRecord),
    /// The parent vanished, moved under another comment, or belongs to a
    /// different post by the time of the write. Nothing was inserted.
    ParentUnavailable,
    /// The post was deleted before the write.
    PostUnavailable,
}

/// Comments ordered by `(created_at, id)`.
#[async_trait]
pub trait CommentsRepository:
    KeysetSource<Row = CommentRecord, Filter = CommentFilter, Cursor = CursorValue>
{
    async fn find_by_id(&self, id: CommentId) -> Result<Option<CommentRecord>>;

    /// Insert `comment`. When `comment.parent_id` is set, the insert only
    /// happens if that parent still exists as a top-level comment of
    /// `comment.post_id` at write time.
    async fn create(&self, comment: NewComment) -> Result<CreateCommentOutcome>;

    /// Delete a comment and, for top-level comments, its replies. Returns
    /// `false` when no such comment existed.
    async fn delete(&self, id: CommentId) -> Result<bool>;
}
