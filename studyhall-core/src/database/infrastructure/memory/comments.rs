use async_trait::async_trait;
use tracing::instrument;

use super::{SharedState, keyset_window};
use crate::database::ports::comments::{CommentsRepository, CreateCommentOutcome};
use crate::domain::comments::{CommentFilter, CommentRecord, NewComment};
use crate::error::{Result, StoreError};
use crate::pagination::{CursorValue, KeysetSource, PageQuery};
use crate::types::CommentId;

#[derive(Debug, Clone)]
pub struct InMemoryCommentsRepository {
    state: SharedState,
}

impl InMemoryCommentsRepository {
    pub(super) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

fn comment_cursor(cursor: &CursorValue) -> Result<CommentId> {
    cursor.as_i64().map(CommentId).ok_or_else(|| {
        StoreError::Internal(format!("comment cursor must be an integer, got {cursor}"))
    })
}

#[async_trait]
impl KeysetSource for InMemoryCommentsRepository {
    type Row = CommentRecord;
    type Filter = CommentFilter;
    type Cursor = CursorValue;

    #[instrument(level = "trace", skip(self))]
    async fn find_many(
        &self,
        query: &PageQuery<CommentFilter, CursorValue>,
    ) -> Result<Vec<CommentRecord>> {
        let state = self.state.read().await;
        let bound = match &query.after {
            Some(cursor) => match state.comment(comment_cursor(cursor)?) {
                Some(comment) => Some((comment.created_at, comment.id)),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        Ok(keyset_window(
            state
                .comments
                .iter()
                .filter(|comment| query.filter.matches(comment))
                .cloned(),
            |comment| (comment.created_at, comment.id),
            bound.as_ref(),
            query.direction,
            query.take,
        ))
    }

    async fn count(&self, filter: &CommentFilter) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .iter()
            .filter(|comment| filter.matches(comment))
            .count() as u64)
    }
}

#[async_trait]
impl CommentsRepository for InMemoryCommentsRepository {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<CommentRecord>> {
        Ok(self.state.read().await.comment(id).cloned())
    }

    async fn create(&self, comment: NewComment) -> Result<CreateCommentOutcome> {
        let mut state = self.state.write().await;

        if state.post(comment.post_id).is_none() {
            return Ok(CreateCommentOutcome::PostUnavailable);
        }
        if let Some(parent_id) = comment.parent_id {
            let parent_ok = state.comment(parent_id).is_some_and(|parent| {
                parent.parent_id.is_none() && parent.post_id == comment.post_id
            });
            if !parent_ok {
                return Ok(CreateCommentOutcome::ParentUnavailable);
            }
        }

        state.last_comment_id += 1;
        let record = CommentRecord {
            id: CommentId(state.last_comment_id),
            content: comment.content,
            author_id: comment.author_id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            mentioned_user_id: comment.mentioned_user_id,
            created_at: state.tick(),
            hidden: false,
        };
        state.comments.push(record.clone());
        Ok(CreateCommentOutcome::Created(record))
    }

    async fn delete(&self, id: CommentId) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state
            .comments
            .retain(|comment| comment.id != id && comment.parent_id != Some(id));
        Ok(state.comments.len() != before)
    }
}
