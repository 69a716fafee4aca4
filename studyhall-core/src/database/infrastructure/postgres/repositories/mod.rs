pub mod comments;
pub mod posts;
pub mod saved_posts;

use chrono::{DateTime, Utc};
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use crate::domain::posts::PostRecord;
use crate::error::{Result, StoreError};
use crate::pagination::SortDirection;
use crate::types::{PostId, UserId};

pub(crate) const POST_COLUMNS: &str =
    "p.id, p.author_id, p.title, p.content, p.created_at, p.hidden";

fn read<'r, T>(row: &'r PgRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Internal(format!("Failed to read {column}: {e}")))
}

/// Map the [`POST_COLUMNS`] of a row.
pub(crate) fn map_post_row(row: &PgRow) -> Result<PostRecord> {
    let id: Uuid = read(row, "id")?;
    let author_id: Uuid = read(row, "author_id")?;
    let created_at: DateTime<Utc> = read(row, "created_at")?;

    Ok(PostRecord {
        id: PostId(id),
        author_id: UserId(author_id),
        title: read(row, "title")?,
        content: read(row, "content")?,
        created_at,
        hidden: read(row, "hidden")?,
    })
}

/// `ORDER BY` over a `(timestamp, id)` key in one direction.
pub(crate) fn order_clause(time_column: &str, id_column: &str, direction: SortDirection) -> String {
    let dir = direction.as_sql();
    format!(" ORDER BY {time_column} {dir}, {id_column} {dir}")
}

/// Escape LIKE metacharacters and wrap the term for substring matching.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

pub(crate) fn take_as_i64(take: usize) -> i64 {
    i64::try_from(take).unwrap_or(i64::MAX)
}
