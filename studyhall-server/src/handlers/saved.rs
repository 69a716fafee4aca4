use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::PathRejection},
};
use uuid::Uuid;

use studyhall_core::{
    api_types::{ListParams, SaveStateResponse},
    domain::saved::{SAVED_POST_KEY, SavedKind, SavedPostRecord, saved_post_cursor},
    error::ValidationError,
    pagination::{
        CompoundCursor, CursorCodec, CursorValue, Page, PageEnvelope,
        PaginationMeta,
    },
    types::PostId,
};

use crate::infra::{app_state::AppState, errors::AppResult};
use crate::middleware::Viewer;

pub async fn like_post_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<SaveStateResponse>> {
    let Path(post_id) = path?;
    save(&state, SavedKind::Like, viewer, post_id).await
}

pub async fn unlike_post_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<SaveStateResponse>> {
    let Path(post_id) = path?;
    unsave(&state, SavedKind::Like, viewer, post_id).await
}

pub async fn bookmark_post_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<SaveStateResponse>> {
    let Path(post_id) = path?;
    save(&state, SavedKind::Bookmark, viewer, post_id).await
}

pub async fn unbookmark_post_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<SaveStateResponse>> {
    let Path(post_id) = path?;
    unsave(&state, SavedKind::Bookmark, viewer, post_id).await
}

/// The viewer's liked posts, most recently liked first.
///
/// `cursor` is the `postId` from the previous page's `nextCursor`. An opaque
/// compound token for the `(userId, postId)` key is accepted as well.
pub async fn list_likes_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PageEnvelope<SavedPostRecord>>> {
    list(&state, SavedKind::Like, viewer, &params).await
}

/// The viewer's bookmarks; same paging rules as the likes listing.
pub async fn list_bookmarks_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PageEnvelope<SavedPostRecord>>> {
    list(&state, SavedKind::Bookmark, viewer, &params).await
}

async fn save(
    state: &AppState,
    kind: SavedKind,
    viewer: Viewer,
    post_id: Uuid,
) -> AppResult<Json<SaveStateResponse>> {
    let changed = state
        .saved_posts()
        .save(kind, viewer.user_id, PostId(post_id))
        .await?;
    Ok(Json(SaveStateResponse {
        saved: true,
        changed,
    }))
}

async fn unsave(
    state: &AppState,
    kind: SavedKind,
    viewer: Viewer,
    post_id: Uuid,
) -> AppResult<Json<SaveStateResponse>> {
    let changed = state
        .saved_posts()
        .unsave(kind, viewer.user_id, PostId(post_id))
        .await?;
    Ok(Json(SaveStateResponse {
        saved: false,
        changed,
    }))
}

async fn list(
    state: &AppState,
    kind: SavedKind,
    viewer: Viewer,
    params: &ListParams,
) -> AppResult<Json<PageEnvelope<SavedPostRecord>>> {
    let limit = state.page_limits().saved.resolve(params.limit())?;
    let service = state.saved_posts();

    let cursor = params
        .cursor()
        .map(|token| saved_cursor(viewer, token))
        .transpose()?;

    let page = match kind {
        SavedKind::Like => service.liked_posts(viewer.user_id, cursor, limit).await?,
        SavedKind::Bookmark => {
            service
                .bookmarked_posts(viewer.user_id, cursor, limit)
                .await?
        }
    };

    Ok(Json(scalar_envelope(page)))
}

/// A bare post id is completed with the viewer's id; anything else must be
/// an encoded `(userId, postId)` cursor.
fn saved_cursor(
    viewer: Viewer,
    token: &str,
) -> Result<CompoundCursor, ValidationError> {
    match Uuid::parse_str(token.trim()) {
        Ok(post_id) => Ok(saved_post_cursor(viewer.user_id, PostId(post_id))),
        Err(_) => CursorCodec::decode_compound(&SAVED_POST_KEY, token),
    }
}

/// Expose the compound cursor as the bare post id; the user half is always
/// the viewer.
fn scalar_envelope(
    page: Page<SavedPostRecord, CompoundCursor>,
) -> PageEnvelope<SavedPostRecord, CursorValue> {
    let next_cursor = page
        .next_cursor
        .as_ref()
        .and_then(|cursor| cursor.get("postId"));

    PageEnvelope {
        data: page.data,
        pagination: PaginationMeta {
            has_more: page.has_more,
            next_cursor,
            total: page.total,
        },
    }
}
