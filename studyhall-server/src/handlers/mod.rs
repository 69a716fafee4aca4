pub mod comments;
pub mod health;
pub mod posts;
pub mod saved;

use studyhall_core::{
    api_types::ListParams,
    error::ValidationError,
    pagination::{CursorCodec, CursorKind},
    types::{CommentId, PostId},
};

/// Decode a post-keyed `cursor` query parameter.
pub(crate) fn post_cursor(
    params: &ListParams,
) -> Result<Option<PostId>, ValidationError> {
    Ok(CursorCodec::decode_optional(CursorKind::Uuid, params.cursor())?
        .and_then(|value| value.as_uuid())
        .map(PostId))
}

/// Decode a comment-keyed `cursor` query parameter.
pub(crate) fn comment_cursor(
    params: &ListParams,
) -> Result<Option<CommentId>, ValidationError> {
    Ok(CursorCodec::decode_optional(CursorKind::Int, params.cursor())?
        .and_then(|value| value.as_i64())
        .map(CommentId))
}
