use std::{any::type_name_of_val, fmt, sync::Arc};

use thiserror::Error;
use tracing::{info, instrument};

use super::model::{
    CONTENT_MAX_CHARS, NewPost, PostFilter, PostRecord, SEARCH_MAX_CHARS, TITLE_MAX_CHARS,
};
use crate::database::ports::posts::PostsRepository;
use crate::domain::{Actor, bounded_text};
use crate::error::{StoreError, ValidationError};
use crate::pagination::{Page, PageLimit, PaginationError, SinglePageFetcher, SortDirection};
use crate::types::{PostId, UserId};

/// Post authoring and the post listings (feed, search, per-author).
#[derive(Clone)]
pub struct PostService<P>
where
    P: PostsRepository + ?Sized,
{
    posts: Arc<P>,
}

impl<P> fmt::Debug for PostService<P>
where
    P: PostsRepository + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostService")
            .field("posts", &type_name_of_val(self.posts.as_ref()))
            .finish()
    }
}

impl<P> PostService<P>
where
    P: PostsRepository + ?Sized,
{
    pub fn new(posts: Arc<P>) -> Self {
        Self { posts }
    }

    #[instrument(skip(self, title, content), fields(author = %actor.user_id))]
    pub async fn create_post(
        &self,
        actor: Actor,
        title: &str,
        content: &str,
    ) -> Result<PostRecord, PostError> {
        let title = bounded_text("title", title, 1, TITLE_MAX_CHARS)?;
        let content = bounded_text("content", content, 1, CONTENT_MAX_CHARS)?;

        let record = self
            .posts
            .create(NewPost {
                author_id: actor.user_id,
                title,
                content,
            })
            .await?;

        info!(post_id = %record.id, "post created");
        Ok(record)
    }

    /// Visible post by id. Hidden posts are reported as missing.
    pub async fn get_post(&self, id: PostId) -> Result<PostRecord, PostError> {
        match self.posts.find_by_id(id).await? {
            Some(post) if !post.hidden => Ok(post),
            _ => Err(PostError::NotFound(id)),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, actor: Actor, id: PostId) -> Result<(), PostError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(PostError::NotFound(id))?;

        if !actor.can_manage(&post) {
            return Err(PostError::Forbidden);
        }

        if !self.posts.delete(id).await? {
            return Err(PostError::NotFound(id));
        }

        info!(post_id = %id, moderator = actor.is_moderator, "post deleted");
        Ok(())
    }

    /// All visible posts, newest first.
    pub async fn feed(
        &self,
        cursor: Option<PostId>,
        limit: PageLimit,
    ) -> Result<Page<PostRecord>, PostError> {
        let page = SinglePageFetcher::new(self.posts.as_ref())
            .paginate(
                PostFilter::feed(),
                SortDirection::Desc,
                cursor.map(Into::into),
                limit,
            )
            .await?;
        Ok(page)
    }

    /// Feed restricted to posts whose title or content contains `term`,
    /// ignoring case.
    pub async fn search(
        &self,
        term: &str,
        cursor: Option<PostId>,
        limit: PageLimit,
    ) -> Result<Page<PostRecord>, PostError> {
        let term = bounded_text("q", term, 1, SEARCH_MAX_CHARS)?;
        let page = SinglePageFetcher::new(self.posts.as_ref())
            .paginate(
                PostFilter::search(term),
                SortDirection::Desc,
                cursor.map(Into::into),
                limit,
            )
            .await?;
        Ok(page)
    }

    /// Posts by one author, newest first, with the author's total post count.
    pub async fn user_posts(
        &self,
        author_id: UserId,
        cursor: Option<PostId>,
        limit: PageLimit,
    ) -> Result<Page<PostRecord>, PostError> {
        let page = SinglePageFetcher::new(self.posts.as_ref())
            .paginate_with_total(
                PostFilter::by_author(author_id),
                SortDirection::Desc,
                cursor.map(Into::into),
                limit,
            )
            .await?;
        Ok(page)
    }
}

#[derive(Debug, Error)]
pub enum PostError {
    #[error("post {0} not found")]
    NotFound(PostId),
    #[error("not allowed to modify this post")]
    Forbidden,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<PaginationError> for PostError {
    fn from(err: PaginationError) -> Self {
        match err {
            PaginationError::Validation(err) => PostError::Validation(err),
            PaginationError::Store(err) => PostError::Storage(err),
        }
    }
}
