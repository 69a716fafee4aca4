use async_trait::async_trait;

use crate::domain::saved::{SavedFilter, SavedKind, SavedPostRecord};
use crate::error::Result;
use crate::pagination::{CompoundCursor, KeysetSource};
use crate::types::{PostId, UserId};

/// Likes and bookmarks, keyed on `(user_id, post_id)` and ordered by
/// `(saved_at, post_id)`.
///
/// The compound cursor names a relation row; implementations resolve its
/// `saved_at` and bound the page on the full tuple.
#[async_trait]
pub trait SavedPostsRepository:
    KeysetSource<Row = SavedPostRecord, Filter = SavedFilter, Cursor = CompoundCursor>
{
    /// Returns `false` when the relation already existed.
    async fn save(&self, kind: SavedKind, user_id: UserId, post_id: PostId) -> Result<bool>;

    /// Returns `false` when there was nothing to remove.
    async fn unsave(&self, kind: SavedKind, user_id: UserId, post_id: PostId) -> Result<bool>;
}
