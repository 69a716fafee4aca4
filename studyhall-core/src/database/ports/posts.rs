use async_trait::async_trait;

use crate::domain::posts::{NewPost, PostFilter, PostRecord};
use crate::error::Result;
use crate::pagination::{CursorValue, KeysetSource};
use crate::types::PostId;

/// Posts ordered by `(created_at, id)`.
#[async_trait]
pub trait PostsRepository:
    KeysetSource<Row = PostRecord, Filter = PostFilter, Cursor = CursorValue>
{
    async fn find_by_id(&self, id: PostId) -> Result<Option<PostRecord>>;

    async fn create(&self, post: NewPost) -> Result<PostRecord>;

    /// Returns `false` when no such post existed.
    async fn delete(&self, id: PostId) -> Result<bool>;
}
