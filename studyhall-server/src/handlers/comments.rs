use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
};
use uuid::Uuid;

use studyhall_core::{
    api_types::{CreateCommentRequest, ListParams},
    domain::comments::CommentRecord,
    pagination::PageEnvelope,
    types::{CommentId, PostId},
};

use super::comment_cursor;
use crate::infra::{app_state::AppState, errors::AppResult};
use crate::middleware::Viewer;

/// Top-level comments of a post, newest first.
///
/// `pagination.total` counts every visible comment on the post, replies
/// included.
pub async fn list_post_comments_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PageEnvelope<CommentRecord>>> {
    let Path(post_id) = path?;
    let limit = state.page_limits().comments.resolve(params.limit())?;
    let cursor = comment_cursor(&params)?;

    let page = state
        .comments()
        .top_level_comments(PostId(post_id), cursor, limit)
        .await?;
    Ok(Json(page.into()))
}

/// Create a comment on a post.
///
/// # Request
///
/// ```json
/// { "content": "Same question here", "parentId": 12 }
/// ```
///
/// `parentId` is optional. When it names a reply, the new comment is stored
/// under that reply's top-level comment and `mentionedUserId` is set to the
/// reply's author.
///
/// # Response
///
/// - `201 Created` with the stored comment
/// - `400 Bad Request` for empty/oversized content or a parent on another post
/// - `404 Not Found` if the post or parent does not exist
pub async fn create_comment_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CommentRecord>)> {
    let Path(post_id) = path?;
    let Json(request) = payload?;
    let comment = state
        .comments()
        .create_comment(
            viewer.actor(),
            PostId(post_id),
            &request.content,
            request.parent_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comment_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<CommentRecord>> {
    let Path(id) = path?;
    let comment = state.comments().get_comment(CommentId(id)).await?;
    Ok(Json(comment))
}

/// Replies under a top-level comment, oldest first, with the reply count
/// as `pagination.total`.
pub async fn list_replies_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PageEnvelope<CommentRecord>>> {
    let Path(parent_id) = path?;
    let limit = state.page_limits().replies.resolve(params.limit())?;
    let cursor = comment_cursor(&params)?;

    let page = state
        .comments()
        .replies(CommentId(parent_id), cursor, limit)
        .await?;
    Ok(Json(page.into()))
}

pub async fn delete_comment_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    state
        .comments()
        .delete_comment(viewer.actor(), CommentId(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
