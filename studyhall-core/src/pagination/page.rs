use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cursor::{CompoundCursor, CursorValue};
use super::request::PageLimit;

/// Rows that can be addressed by a single-field cursor.
pub trait CursorKeyed {
    fn cursor_key(&self) -> CursorValue;
}

/// Rows whose stable identity is a composite key.
pub trait CompoundKeyed {
    fn compound_key(&self) -> CompoundCursor;
}

/// One client-facing page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T, C = CursorValue> {
    pub data: Vec<T>,
    pub has_more: bool,
    pub next_cursor: Option<C>,
    /// Grand total for the filter, only when the caller asked for one.
    pub total: Option<u64>,
}

impl<T, C> Page<T, C> {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            has_more: false,
            next_cursor: None,
            total: None,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

/// Turns over-fetched store rows into a [`Page`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PageAssembler;

impl PageAssembler {
    /// `rows` is the raw result of a `limit + 1` fetch. At most `limit` rows
    /// are kept and the cursor comes from the last kept row, never from the
    /// discarded overflow row.
    pub fn assemble<T, C>(mut rows: Vec<T>, limit: PageLimit, key: impl Fn(&T) -> C) -> Page<T, C> {
        let fetched = rows.len();
        let has_more = fetched > limit.get();
        rows.truncate(limit.get());

        let next_cursor = if has_more { rows.last().map(key) } else { None };

        debug!(fetched, kept = rows.len(), has_more, "assembled page");

        Page {
            data: rows,
            has_more,
            next_cursor,
            total: None,
        }
    }
}

/// Wire shape of a paginated response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEnvelope<T, C = CursorValue> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta<C>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta<C = CursorValue> {
    pub has_more: bool,
    pub next_cursor: Option<C>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub total: Option<u64>,
}

impl<T, C> From<Page<T, C>> for PageEnvelope<T, C> {
    fn from(page: Page<T, C>) -> Self {
        Self {
            data: page.data,
            pagination: PaginationMeta {
                has_more: page.has_more,
                next_cursor: page.next_cursor,
                total: page.total,
            },
        }
    }
}
