use std::{any::type_name_of_val, fmt, sync::Arc};

use thiserror::Error;
use tracing::{debug, info, instrument};

use super::model::{
    SAVED_POST_KEY, SavedFilter, SavedKind, SavedPostRecord, cursor_fields, saved_post_cursor,
};
use crate::database::ports::{posts::PostsRepository, saved_posts::SavedPostsRepository};
use crate::error::{StoreError, ValidationError};
use crate::pagination::{
    CompoundCursor, CompoundPageFetcher, Page, PageLimit, PaginationError, SortDirection,
};
use crate::types::{PostId, UserId};

/// Like/bookmark toggling and the per-user saved listings.
#[derive(Clone)]
pub struct SavedPostService<S, P>
where
    S: SavedPostsRepository + ?Sized,
    P: PostsRepository + ?Sized,
{
    saved: Arc<S>,
    posts: Arc<P>,
}

impl<S, P> fmt::Debug for SavedPostService<S, P>
where
    S: SavedPostsRepository + ?Sized,
    P: PostsRepository + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SavedPostService")
            .field("saved", &type_name_of_val(self.saved.as_ref()))
            .field("posts", &type_name_of_val(self.posts.as_ref()))
            .finish()
    }
}

impl<S, P> SavedPostService<S, P>
where
    S: SavedPostsRepository + ?Sized,
    P: PostsRepository + ?Sized,
{
    pub fn new(saved: Arc<S>, posts: Arc<P>) -> Self {
        Self { saved, posts }
    }

    /// Record a like or bookmark. Saving twice is a no-op; the return value
    /// tells whether a new relation was created.
    #[instrument(skip(self))]
    pub async fn save(
        &self,
        kind: SavedKind,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<bool, SavedPostError> {
        match self.posts.find_by_id(post_id).await? {
            Some(post) if !post.hidden => {}
            _ => return Err(SavedPostError::PostNotFound(post_id)),
        }

        let created = self.saved.save(kind, user_id, post_id).await?;
        if created {
            info!(kind = kind.as_str(), %user_id, %post_id, "post saved");
        }
        Ok(created)
    }

    /// Remove a like or bookmark. Removing a missing relation is a no-op.
    #[instrument(skip(self))]
    pub async fn unsave(
        &self,
        kind: SavedKind,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<bool, SavedPostError> {
        let removed = self.saved.unsave(kind, user_id, post_id).await?;
        if removed {
            info!(kind = kind.as_str(), %user_id, %post_id, "post unsaved");
        }
        Ok(removed)
    }

    /// A user's likes or bookmarks, most recently saved first.
    ///
    /// `cursor` must be a complete `(userId, postId)` tuple belonging to
    /// `user_id`.
    pub async fn list(
        &self,
        kind: SavedKind,
        user_id: UserId,
        cursor: Option<CompoundCursor>,
        limit: PageLimit,
    ) -> Result<Page<SavedPostRecord, CompoundCursor>, SavedPostError> {
        if let Some(cursor) = &cursor {
            cursor.validate_against(&SAVED_POST_KEY)?;
            let (owner, _) = cursor_fields(cursor)?;
            if owner != user_id {
                return Err(ValidationError::InvalidCursor {
                    raw: owner.to_string(),
                    expected: "cursor issued to this user",
                }
                .into());
            }
        }

        let page = CompoundPageFetcher::new(self.saved.as_ref(), &SAVED_POST_KEY)
            .paginate(
                SavedFilter { user_id, kind },
                SortDirection::Desc,
                cursor,
                limit,
            )
            .await?;
        debug!(kind = kind.as_str(), rows = page.data.len(), "listed saved posts");
        Ok(page)
    }

    /// [`list`](Self::list) for callers that only carry the last post id;
    /// the tuple is completed with `user_id`.
    pub async fn list_after_post(
        &self,
        kind: SavedKind,
        user_id: UserId,
        after_post: Option<PostId>,
        limit: PageLimit,
    ) -> Result<Page<SavedPostRecord, CompoundCursor>, SavedPostError> {
        let cursor = after_post.map(|post_id| saved_post_cursor(user_id, post_id));
        self.list(kind, user_id, cursor, limit).await
    }

    pub async fn liked_posts(
        &self,
        user_id: UserId,
        cursor: Option<CompoundCursor>,
        limit: PageLimit,
    ) -> Result<Page<SavedPostRecord, CompoundCursor>, SavedPostError> {
        self.list(SavedKind::Like, user_id, cursor, limit).await
    }

    pub async fn bookmarked_posts(
        &self,
        user_id: UserId,
        cursor: Option<CompoundCursor>,
        limit: PageLimit,
    ) -> Result<Page<SavedPostRecord, CompoundCursor>, SavedPostError> {
        self.list(SavedKind::Bookmark, user_id, cursor, limit).await
    }
}

#[derive(Debug, Error)]
pub enum SavedPostError {
    #[error("post {0} not found")]
    PostNotFound(PostId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<PaginationError> for SavedPostError {
    fn from(err: PaginationError) -> Self {
        match err {
            PaginationError::Validation(err) => SavedPostError::Validation(err),
            PaginationError::Store(err) => SavedPostError::Storage(err),
        }
    }
}
