use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::{
    AppState,
    handlers::{comments, health, posts, saved},
    middleware::viewer_middleware,
};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        // Public endpoints
        .route("/health", get(health::health_handler))
        // Everything else needs a gateway-identified viewer
        .merge(create_protected_routes())
}

/// Create protected routes that require a viewer
fn create_protected_routes() -> Router<AppState> {
    Router::new()
        // Posts and feed
        .route(
            "/posts",
            get(posts::list_posts_handler).post(posts::create_post_handler),
        )
        .route(
            "/posts/{id}",
            get(posts::get_post_handler).delete(posts::delete_post_handler),
        )
        .route("/users/{id}/posts", get(posts::list_user_posts_handler))
        // Likes and bookmarks
        .route(
            "/posts/{id}/like",
            put(saved::like_post_handler).delete(saved::unlike_post_handler),
        )
        .route(
            "/posts/{id}/bookmark",
            put(saved::bookmark_post_handler)
                .delete(saved::unbookmark_post_handler),
        )
        .route("/users/me/likes", get(saved::list_likes_handler))
        .route("/users/me/bookmarks", get(saved::list_bookmarks_handler))
        // Comment threads
        .route(
            "/posts/{id}/comments",
            get(comments::list_post_comments_handler)
                .post(comments::create_comment_handler),
        )
        .route(
            "/comments/{id}",
            get(comments::get_comment_handler)
                .delete(comments::delete_comment_handler),
        )
        .route(
            "/comments/{id}/replies",
            get(comments::list_replies_handler),
        )
        .layer(middleware::from_fn(viewer_middleware))
}
