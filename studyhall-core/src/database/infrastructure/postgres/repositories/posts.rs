use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use super::{POST_COLUMNS, like_pattern, map_post_row, order_clause, take_as_i64};
use crate::database::ports::posts::PostsRepository;
use crate::domain::posts::{NewPost, PostFilter, PostRecord};
use crate::error::{Result, StoreError};
use crate::pagination::{CursorValue, KeysetSource, PageQuery};
use crate::types::PostId;

#[derive(Debug, Clone)]
pub struct PostgresPostsRepository {
    pool: PgPool,
}

impl PostgresPostsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
        builder.push(" WHERE NOT p.hidden");
        if let Some(author_id) = filter.author_id {
            builder.push(" AND p.author_id = ");
            builder.push_bind(author_id.as_uuid());
        }
        if let Some(term) = &filter.search {
            let pattern = like_pattern(term);
            builder.push(" AND (p.title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR p.content ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
    }
}

#[async_trait]
impl KeysetSource for PostgresPostsRepository {
    type Row = PostRecord;
    type Filter = PostFilter;
    type Cursor = CursorValue;

    #[instrument(level = "debug", skip(self))]
    async fn find_many(
        &self,
        query: &PageQuery<PostFilter, CursorValue>,
    ) -> Result<Vec<PostRecord>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {POST_COLUMNS} FROM posts p"));
        Self::push_filter(&mut builder, &query.filter);

        if let Some(cursor) = &query.after {
            let cursor_id: Uuid = cursor.as_uuid().ok_or_else(|| {
                StoreError::Internal(format!("post cursor must be a uuid, got {cursor}"))
            })?;
            builder.push(format!(
                " AND (p.created_at, p.id) {} \
                 (SELECT a.created_at, a.id FROM posts a WHERE a.id = ",
                query.direction.after_operator()
            ));
            builder.push_bind(cursor_id);
            builder.push(")");
        }

        builder.push(order_clause("p.created_at", "p.id", query.direction));
        builder.push(" LIMIT ");
        builder.push_bind(take_as_i64(query.take));

        let rows = builder
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to list posts: {e}")))?;

        rows.iter().map(map_post_row).collect()
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        Self::push_filter(&mut builder, filter);

        let row = builder
            .build()
            .fetch_one(self.pool())
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to count posts: {e}")))?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| StoreError::Internal(format!("Failed to read post count: {e}")))?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl PostsRepository for PostgresPostsRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<PostRecord>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to load post: {e}")))?;

        row.as_ref().map(map_post_row).transpose()
    }

    #[instrument(skip(self, post), fields(author = %post.author_id))]
    async fn create(&self, post: NewPost) -> Result<PostRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts AS p (id, author_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING p.id, p.author_id, p.title, p.content, p.created_at, p.hidden
            "#,
        )
        .bind(PostId::new().as_uuid())
        .bind(post.author_id.as_uuid())
        .bind(post.title)
        .bind(post.content)
        .fetch_one(self.pool())
        .await
        .map_err(|e| StoreError::Internal(format!("Failed to create post: {e}")))?;

        map_post_row(&row)
    }

    async fn delete(&self, id: PostId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| StoreError::Internal(format!("Failed to delete post: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}
