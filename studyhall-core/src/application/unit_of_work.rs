use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "database")]
use crate::database::PostgresDatabase;
use crate::database::{
    InMemoryStore,
    ports::{
        comments::CommentsRepository, posts::PostsRepository, saved_posts::SavedPostsRepository,
    },
};
use crate::domain::{comments::CommentService, posts::PostService, saved::SavedPostService};

pub type DynPostService = PostService<dyn PostsRepository>;
pub type DynCommentService = CommentService<dyn CommentsRepository, dyn PostsRepository>;
pub type DynSavedPostService = SavedPostService<dyn SavedPostsRepository, dyn PostsRepository>;

/// Aggregates the repository ports used by application services.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub posts: Arc<dyn PostsRepository>,
    pub comments: Arc<dyn CommentsRepository>,
    pub saved_posts: Arc<dyn SavedPostsRepository>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("posts", &type_name_of_val(self.posts.as_ref()))
            .field("comments", &type_name_of_val(self.comments.as_ref()))
            .field("saved_posts", &type_name_of_val(self.saved_posts.as_ref()))
            .finish()
    }
}

impl AppUnitOfWork {
    #[cfg(feature = "database")]
    pub fn from_postgres(db: &PostgresDatabase) -> Self {
        Self {
            posts: Arc::new(db.posts()),
            comments: Arc::new(db.comments()),
            saved_posts: Arc::new(db.saved_posts()),
        }
    }

    pub fn in_memory(store: &InMemoryStore) -> Self {
        Self {
            posts: Arc::new(store.posts()),
            comments: Arc::new(store.comments()),
            saved_posts: Arc::new(store.saved_posts()),
        }
    }

    pub fn post_service(&self) -> DynPostService {
        PostService::new(self.posts.clone())
    }

    pub fn comment_service(&self) -> DynCommentService {
        CommentService::new(self.comments.clone(), self.posts.clone())
    }

    pub fn saved_post_service(&self) -> DynSavedPostService {
        SavedPostService::new(self.saved_posts.clone(), self.posts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Actor;
    use crate::pagination::PageLimit;
    use crate::types::UserId;

    #[tokio::test]
    async fn services_share_one_in_memory_store() {
        let uow = AppUnitOfWork::in_memory(&InMemoryStore::new());
        let actor = Actor::member(UserId::new());

        let post = uow
            .post_service()
            .create_post(actor, "Shared", "store")
            .await
            .expect("create post");
        let comment = uow
            .comment_service()
            .create_comment(actor, post.id, "first", None)
            .await
            .expect("comment on post from another service");
        assert!(comment.is_top_level());

        let limit = PageLimit::new(10, 50).expect("limit");
        let page = uow.post_service().feed(None, limit).await.expect("feed");
        assert_eq!(page.data, vec![post]);

        let debug = format!("{uow:?}");
        assert!(debug.contains("InMemoryPostsRepository"));
    }
}
