use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
};
use uuid::Uuid;

use studyhall_core::{
    api_types::{CreatePostRequest, ListParams},
    domain::posts::PostRecord,
    pagination::PageEnvelope,
    types::{PostId, UserId},
};

use super::post_cursor;
use crate::infra::{app_state::AppState, errors::AppResult};
use crate::middleware::Viewer;

/// The main feed, newest first. With `q` set, only posts whose title or
/// content contains the term (case-insensitive) are listed.
pub async fn list_posts_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PageEnvelope<PostRecord>>> {
    let limit = state.page_limits().feed.resolve(params.limit())?;
    let cursor = post_cursor(&params)?;

    let page = match params.q.as_deref().filter(|q| !q.trim().is_empty()) {
        Some(term) => state.posts().search(term, cursor, limit).await?,
        None => state.posts().feed(cursor, limit).await?,
    };
    Ok(Json(page.into()))
}

pub async fn create_post_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<PostRecord>)> {
    let Json(request) = payload?;
    let post = state
        .posts()
        .create_post(viewer.actor(), &request.title, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<PostRecord>> {
    let Path(id) = path?;
    let post = state.posts().get_post(PostId(id)).await?;
    Ok(Json(post))
}

pub async fn delete_post_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    state.posts().delete_post(viewer.actor(), PostId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Posts by one author, newest first, with `pagination.total` set to the
/// author's visible post count.
pub async fn list_user_posts_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PageEnvelope<PostRecord>>> {
    let Path(author) = path?;
    let limit = state.page_limits().feed.resolve(params.limit())?;
    let cursor = post_cursor(&params)?;

    let page = state
        .posts()
        .user_posts(UserId(author), cursor, limit)
        .await?;
    Ok(Json(page.into()))
}
