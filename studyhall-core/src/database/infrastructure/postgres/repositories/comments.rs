use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{order_clause, take_as_i64};
use crate::database::ports::comments::{CommentsRepository, CreateCommentOutcome};
use crate::domain::comments::{CommentFilter, CommentRecord, CommentScope, NewComment};
use crate::error::{Result, StoreError};
use crate::pagination::{CursorValue, KeysetSource, PageQuery};
use crate::types::{CommentId, PostId, UserId};

const COMMENT_COLUMNS: &str = "c.id, c.content, c.author_id, c.post_id, c.parent_id, \
                               c.mentioned_user_id, c.created_at, c.hidden";

#[derive(Debug, Clone)]
pub struct PostgresCommentsRepository {
    pool: PgPool,
}

impl PostgresCommentsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<CommentRecord> {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| StoreError::Internal(format!("Failed to read comment id: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| StoreError::Internal(format!("Failed to read comment content: {e}")))?;
        let author_id: Uuid = row
            .try_get("author_id")
            .map_err(|e| StoreError::Internal(format!("Failed to read author_id: {e}")))?;
        let post_id: Uuid = row
            .try_get("post_id")
            .map_err(|e| StoreError::Internal(format!("Failed to read post_id: {e}")))?;
        let parent_id: Option<i64> = row
            .try_get("parent_id")
            .map_err(|e| StoreError::Internal(format!("Failed to read parent_id: {e}")))?;
        let mentioned_user_id: Option<Uuid> = row
            .try_get("mentioned_user_id")
            .map_err(|e| StoreError::Internal(format!("Failed to read mentioned_user_id: {e}")))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| StoreError::Internal(format!("Failed to read created_at: {e}")))?;
        let hidden: bool = row
            .try_get("hidden")
            .map_err(|e| StoreError::Internal(format!("Failed to read hidden: {e}")))?;

        Ok(CommentRecord {
            id: CommentId(id),
            content,
            author_id: UserId(author_id),
            post_id: PostId(post_id),
            parent_id: parent_id.map(CommentId),
            mentioned_user_id: mentioned_user_id.map(UserId),
            created_at,
            hidden,
        })
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &CommentFilter) {
        builder.push(" WHERE NOT c.hidden");
        match filter.scope {
            CommentScope::TopLevel(post_id) => {
                builder.push(" AND c.parent_id IS NULL AND c.post_id = ");
                builder.push_bind(post_id.as_uuid());
            }
            CommentScope::RepliesTo(parent_id) => {
                builder.push(" AND c.parent_id = ");
                builder.push_bind(parent_id.as_i64());
            }
            CommentScope::WholePost(post_id) => {
                builder.push(" AND c.post_id = ");
                builder.push_bind(post_id.as_uuid());
            }
        }
    }
}

#[async_trait]
impl KeysetSource for PostgresCommentsRepository {
    type Row = CommentRecord;
    type Filter = CommentFilter;
    type Cursor = CursorValue;

    #[instrument(level = "debug", skip(self))]
    async fn find_many(
        &self,
        query: &PageQuery<CommentFilter, CursorValue>,
    ) -> Result<Vec<CommentRecord>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {COMMENT_COLUMNS} FROM comments c"));
        Self::push_filter(&mut builder, &query.filter);

        if let Some(cursor) = &query.after {
            let cursor_id = cursor.as_i64().ok_or_else(|| {
                StoreError::Internal(format!("comment cursor must be an integer, got {cursor}"))
            })?;
            builder.push(format!(
                " AND (c.created_at, c.id) {} \
                 (SELECT a.created_at, a.id FROM comments a WHERE a.id = ",
                query.direction.after_operator()
            ));
            builder.push_bind(cursor_id);
            builder.push(")");
        }

        builder.push(order_clause("c.created_at", "c.id", query.direction));
        builder.push(" LIMIT ");
        builder.push_bind(take_as_i64(query.take));

        let rows = builder
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to list comments: {e}")))?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn count(&self, filter: &CommentFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM comments c");
        Self::push_filter(&mut builder, filter);

        let row = builder
            .build()
            .fetch_one(self.pool())
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to count comments: {e}")))?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| StoreError::Internal(format!("Failed to read comment count: {e}")))?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl CommentsRepository for PostgresCommentsRepository {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<CommentRecord>> {
        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = $1"))
            .bind(id.as_i64())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to load comment: {e}")))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// The post and parent rows are locked `FOR KEY SHARE` for the rest of
    /// the transaction, so neither can be deleted between the check and the
    /// insert.
    #[instrument(
        skip(self, comment),
        fields(post_id = %comment.post_id, parent_id = ?comment.parent_id)
    )]
    async fn create(&self, comment: NewComment) -> Result<CreateCommentOutcome> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to begin transaction: {e}")))?;

        let post = sqlx::query("SELECT id FROM posts WHERE id = $1 FOR KEY SHARE")
            .bind(comment.post_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to lock post: {e}")))?;
        if post.is_none() {
            return Ok(CreateCommentOutcome::PostUnavailable);
        }

        if let Some(parent_id) = comment.parent_id {
            let parent = sqlx::query(
                r#"
                SELECT id FROM comments
                WHERE id = $1 AND post_id = $2 AND parent_id IS NULL
                FOR KEY SHARE
                "#,
            )
            .bind(parent_id.as_i64())
            .bind(comment.post_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to lock parent comment: {e}")))?;

            if parent.is_none() {
                debug!(%parent_id, "parent no longer a top-level comment of the post");
                return Ok(CreateCommentOutcome::ParentUnavailable);
            }
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO comments AS c (content, author_id, post_id, parent_id, mentioned_user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING c.id, c.content, c.author_id, c.post_id, c.parent_id,
                      c.mentioned_user_id, c.created_at, c.hidden
            "#,
        )
        .bind(comment.content)
        .bind(comment.author_id.as_uuid())
        .bind(comment.post_id.as_uuid())
        .bind(comment.parent_id.map(|id| id.as_i64()))
        .bind(comment.mentioned_user_id.map(|id| id.as_uuid()))
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) => {
                if let Some(db_err) = e.as_database_error() {
                    match db_err.constraint() {
                        Some("comments_parent_id_fkey") => {
                            return Ok(CreateCommentOutcome::ParentUnavailable);
                        }
                        Some("comments_post_id_fkey") => {
                            return Ok(CreateCommentOutcome::PostUnavailable);
                        }
                        _ => {}
                    }
                }
                return Err(StoreError::Internal(format!("Failed to create comment: {e}")));
            }
        };
        let record = Self::map_row(&row)?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to commit comment: {e}")))?;

        Ok(CreateCommentOutcome::Created(record))
    }

    async fn delete(&self, id: CommentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool())
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to delete comment: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}
