use async_trait::async_trait;
use tracing::instrument;

use super::{SavedRow, SharedState, keyset_window};
use crate::database::ports::saved_posts::SavedPostsRepository;
use crate::domain::saved::{SavedFilter, SavedKind, SavedPostRecord, cursor_fields};
use crate::error::{Result, StoreError};
use crate::pagination::{CompoundCursor, KeysetSource, PageQuery};
use crate::types::{PostId, UserId};

#[derive(Debug, Clone)]
pub struct InMemorySavedPostsRepository {
    state: SharedState,
}

impl InMemorySavedPostsRepository {
    pub(super) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl KeysetSource for InMemorySavedPostsRepository {
    type Row = SavedPostRecord;
    type Filter = SavedFilter;
    type Cursor = CompoundCursor;

    #[instrument(level = "trace", skip(self))]
    async fn find_many(
        &self,
        query: &PageQuery<SavedFilter, CompoundCursor>,
    ) -> Result<Vec<SavedPostRecord>> {
        let state = self.state.read().await;
        let filter = query.filter;

        let bound = match &query.after {
            Some(cursor) => {
                let (user_id, post_id) = cursor_fields(cursor)
                    .map_err(|e| StoreError::Internal(format!("Unresolvable saved cursor: {e}")))?;
                let anchor = state.saved.iter().find(|row| {
                    row.kind == filter.kind && row.user_id == user_id && row.post_id == post_id
                });
                match anchor {
                    Some(row) => Some((row.saved_at, row.post_id)),
                    None => return Ok(Vec::new()),
                }
            }
            None => None,
        };

        let joined = state
            .saved
            .iter()
            .filter(|row| row.kind == filter.kind && row.user_id == filter.user_id)
            .filter_map(|row| {
                let post = state.post(row.post_id)?;
                (!post.hidden).then(|| SavedPostRecord {
                    user_id: row.user_id,
                    saved_at: row.saved_at,
                    post: post.clone(),
                })
            });

        Ok(keyset_window(
            joined,
            |record| (record.saved_at, record.post.id),
            bound.as_ref(),
            query.direction,
            query.take,
        ))
    }

    async fn count(&self, filter: &SavedFilter) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state
            .saved
            .iter()
            .filter(|row| row.kind == filter.kind && row.user_id == filter.user_id)
            .filter(|row| state.post(row.post_id).is_some_and(|post| !post.hidden))
            .count() as u64)
    }
}

#[async_trait]
impl SavedPostsRepository for InMemorySavedPostsRepository {
    async fn save(&self, kind: SavedKind, user_id: UserId, post_id: PostId) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.post(post_id).is_none() {
            return Err(StoreError::Conflict(format!("post {post_id} does not exist")));
        }
        let exists = state
            .saved
            .iter()
            .any(|row| row.kind == kind && row.user_id == user_id && row.post_id == post_id);
        if exists {
            return Ok(false);
        }
        let saved_at = state.tick();
        state.saved.push(SavedRow {
            kind,
            user_id,
            post_id,
            saved_at,
        });
        Ok(true)
    }

    async fn unsave(&self, kind: SavedKind, user_id: UserId, post_id: PostId) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.saved.len();
        state
            .saved
            .retain(|row| !(row.kind == kind && row.user_id == user_id && row.post_id == post_id));
        Ok(state.saved.len() != before)
    }
}
