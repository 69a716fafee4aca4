use tracing::instrument;

use super::model::{CommentFilter, CommentRecord};
use crate::database::ports::comments::CommentsRepository;
use crate::pagination::{Page, PageLimit, PaginationError, SinglePageFetcher, SortDirection};
use crate::types::{CommentId, PostId};

/// The two read shapes of a thread over one comment collection.
#[derive(Debug)]
pub struct ThreadPaginationAdapter<'a, C: ?Sized> {
    comments: &'a C,
}

impl<'a, C> ThreadPaginationAdapter<'a, C>
where
    C: CommentsRepository + ?Sized,
{
    pub fn new(comments: &'a C) -> Self {
        Self { comments }
    }

    /// Top-level comments, newest first. `total` counts every visible comment
    /// on the post, replies included.
    #[instrument(level = "debug", skip(self, limit))]
    pub async fn top_level_for_post(
        &self,
        post_id: PostId,
        cursor: Option<CommentId>,
        limit: PageLimit,
    ) -> Result<Page<CommentRecord>, PaginationError> {
        let total = self.comments.count(&CommentFilter::whole_post(post_id)).await?;
        let page = SinglePageFetcher::new(self.comments)
            .paginate(
                CommentFilter::top_level(post_id),
                SortDirection::Desc,
                cursor.map(Into::into),
                limit,
            )
            .await?;
        Ok(page.with_total(total))
    }

    /// Replies under one top-level comment, oldest first so they read as a
    /// conversation. `total` is the reply count.
    #[instrument(level = "debug", skip(self, limit))]
    pub async fn replies_for_comment(
        &self,
        parent_id: CommentId,
        cursor: Option<CommentId>,
        limit: PageLimit,
    ) -> Result<Page<CommentRecord>, PaginationError> {
        SinglePageFetcher::new(self.comments)
            .paginate_with_total(
                CommentFilter::replies_to(parent_id),
                SortDirection::Asc,
                cursor.map(Into::into),
                limit,
            )
            .await
    }
}
