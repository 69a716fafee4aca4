use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use super::{POST_COLUMNS, map_post_row, order_clause, take_as_i64};
use crate::database::ports::saved_posts::SavedPostsRepository;
use crate::domain::saved::{SavedFilter, SavedKind, SavedPostRecord, cursor_fields};
use crate::error::{Result, StoreError};
use crate::pagination::{CompoundCursor, KeysetSource, PageQuery};
use crate::types::{PostId, UserId};

fn table(kind: SavedKind) -> &'static str {
    match kind {
        SavedKind::Like => "post_likes",
        SavedKind::Bookmark => "post_bookmarks",
    }
}

#[derive(Debug, Clone)]
pub struct PostgresSavedPostsRepository {
    pool: PgPool,
}

impl PostgresSavedPostsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl KeysetSource for PostgresSavedPostsRepository {
    type Row = SavedPostRecord;
    type Filter = SavedFilter;
    type Cursor = CompoundCursor;

    #[instrument(level = "debug", skip(self))]
    async fn find_many(
        &self,
        query: &PageQuery<SavedFilter, CompoundCursor>,
    ) -> Result<Vec<SavedPostRecord>> {
        let table = table(query.filter.kind);
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT s.user_id, s.created_at AS saved_at, {POST_COLUMNS} \
             FROM {table} s JOIN posts p ON p.id = s.post_id \
             WHERE NOT p.hidden AND s.user_id = "
        ));
        builder.push_bind(query.filter.user_id.as_uuid());

        if let Some(cursor) = &query.after {
            let (cursor_user, cursor_post) = cursor_fields(cursor)
                .map_err(|e| StoreError::Internal(format!("Unresolvable saved cursor: {e}")))?;
            // Bound on the whole (created_at, post_id) tuple of the cursor row.
            builder.push(format!(
                " AND (s.created_at, s.post_id) {} (SELECT a.created_at, a.post_id \
                 FROM {table} a WHERE a.user_id = ",
                query.direction.after_operator()
            ));
            builder.push_bind(cursor_user.as_uuid());
            builder.push(" AND a.post_id = ");
            builder.push_bind(cursor_post.as_uuid());
            builder.push(")");
        }

        builder.push(order_clause("s.created_at", "s.post_id", query.direction));
        builder.push(" LIMIT ");
        builder.push_bind(take_as_i64(query.take));

        let rows = builder
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to list saved posts: {e}")))?;

        rows.iter()
            .map(|row| -> Result<SavedPostRecord> {
                let user_id: uuid::Uuid = row
                    .try_get("user_id")
                    .map_err(|e| StoreError::Internal(format!("Failed to read user_id: {e}")))?;
                let saved_at: DateTime<Utc> = row
                    .try_get("saved_at")
                    .map_err(|e| StoreError::Internal(format!("Failed to read saved_at: {e}")))?;
                Ok(SavedPostRecord {
                    user_id: UserId(user_id),
                    saved_at,
                    post: map_post_row(row)?,
                })
            })
            .collect()
    }

    async fn count(&self, filter: &SavedFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) FROM {} s JOIN posts p ON p.id = s.post_id \
             WHERE NOT p.hidden AND s.user_id = ",
            table(filter.kind)
        ));
        builder.push_bind(filter.user_id.as_uuid());

        let row = builder
            .build()
            .fetch_one(self.pool())
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to count saved posts: {e}")))?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| StoreError::Internal(format!("Failed to read saved count: {e}")))?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl SavedPostsRepository for PostgresSavedPostsRepository {
    #[instrument(skip(self))]
    async fn save(&self, kind: SavedKind, user_id: UserId, post_id: PostId) -> Result<bool> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (user_id, post_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            table(kind)
        ))
        .bind(user_id.as_uuid())
        .bind(post_id.as_uuid())
        .execute(self.pool())
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error()
                && db_err.is_foreign_key_violation()
            {
                return StoreError::Conflict(format!("post {post_id} does not exist"));
            }
            StoreError::Internal(format!("Failed to save post: {e}"))
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn unsave(&self, kind: SavedKind, user_id: UserId, post_id: PostId) -> Result<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = $1 AND post_id = $2",
            table(kind)
        ))
        .bind(user_id.as_uuid())
        .bind(post_id.as_uuid())
        .execute(self.pool())
        .await
        .map_err(|e| StoreError::Internal(format!("Failed to unsave post: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
