use async_trait::async_trait;
use tracing::instrument;

use super::{SharedState, keyset_window};
use crate::database::ports::posts::PostsRepository;
use crate::domain::posts::{NewPost, PostFilter, PostRecord};
use crate::error::{Result, StoreError};
use crate::pagination::{CursorValue, KeysetSource, PageQuery};
use crate::types::PostId;

#[derive(Debug, Clone)]
pub struct InMemoryPostsRepository {
    state: SharedState,
}

impl InMemoryPostsRepository {
    pub(super) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

fn post_cursor(cursor: &CursorValue) -> Result<PostId> {
    cursor
        .as_uuid()
        .map(PostId)
        .ok_or_else(|| StoreError::Internal(format!("post cursor must be a uuid, got {cursor}")))
}

#[async_trait]
impl KeysetSource for InMemoryPostsRepository {
    type Row = PostRecord;
    type Filter = PostFilter;
    type Cursor = CursorValue;

    #[instrument(level = "trace", skip(self))]
    async fn find_many(
        &self,
        query: &PageQuery<PostFilter, CursorValue>,
    ) -> Result<Vec<PostRecord>> {
        let state = self.state.read().await;
        let bound = match &query.after {
            Some(cursor) => match state.post(post_cursor(cursor)?) {
                Some(post) => Some((post.created_at, post.id)),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        Ok(keyset_window(
            state.posts.iter().filter(|post| query.filter.matches(post)).cloned(),
            |post| (post.created_at, post.id),
            bound.as_ref(),
            query.direction,
            query.take,
        ))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.posts.iter().filter(|post| filter.matches(post)).count() as u64)
    }
}

#[async_trait]
impl PostsRepository for InMemoryPostsRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<PostRecord>> {
        Ok(self.state.read().await.post(id).cloned())
    }

    async fn create(&self, post: NewPost) -> Result<PostRecord> {
        let mut state = self.state.write().await;
        let record = PostRecord {
            id: PostId::new(),
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            created_at: state.tick(),
            hidden: false,
        };
        state.posts.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: PostId) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.posts.len();
        state.posts.retain(|post| post.id != id);
        if state.posts.len() == before {
            return Ok(false);
        }
        state.comments.retain(|comment| comment.post_id != id);
        state.saved.retain(|row| row.post_id != id);
        Ok(true)
    }
}
