use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::posts::PostRecord;
use crate::error::ValidationError;
use crate::pagination::{
    CompositeKey, CompoundCursor, CompoundKeyed, CursorKind, CursorValue, KeyPart,
};
use crate::types::{PostId, UserId};

/// Identity of a like or bookmark row.
pub static SAVED_POST_KEY: CompositeKey = CompositeKey::new(&[
    KeyPart {
        name: "userId",
        kind: CursorKind::Uuid,
    },
    KeyPart {
        name: "postId",
        kind: CursorKind::Uuid,
    },
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavedKind {
    Like,
    Bookmark,
}

impl SavedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SavedKind::Like => "like",
            SavedKind::Bookmark => "bookmark",
        }
    }
}

/// A saved relation joined with the post it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPostRecord {
    pub user_id: UserId,
    pub saved_at: DateTime<Utc>,
    pub post: PostRecord,
}

impl SavedPostRecord {
    pub fn post_id(&self) -> PostId {
        self.post.id
    }
}

impl CompoundKeyed for SavedPostRecord {
    fn compound_key(&self) -> CompoundCursor {
        saved_post_cursor(self.user_id, self.post.id)
    }
}

/// Build the complete `(userId, postId)` cursor tuple.
pub fn saved_post_cursor(user_id: UserId, post_id: PostId) -> CompoundCursor {
    CompoundCursor::from_row_key(vec![
        ("userId", CursorValue::from(user_id)),
        ("postId", CursorValue::from(post_id)),
    ])
}

/// Read a resolved cursor back into its key fields.
pub(crate) fn cursor_fields(
    cursor: &CompoundCursor,
) -> Result<(UserId, PostId), ValidationError> {
    let user = cursor
        .get("userId")
        .and_then(|value| value.as_uuid())
        .ok_or(ValidationError::MissingCursorField { field: "userId" })?;
    let post = cursor
        .get("postId")
        .and_then(|value| value.as_uuid())
        .ok_or(ValidationError::MissingCursorField { field: "postId" })?;
    Ok((UserId(user), PostId(post)))
}

/// One user's likes or bookmarks. Relations pointing at hidden posts are
/// not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedFilter {
    pub user_id: UserId,
    pub kind: SavedKind,
}
