use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;

use super::cursor::{CompositeKey, CompoundCursor, CursorValue};
use super::page::{CompoundKeyed, CursorKeyed, Page, PageAssembler};
use super::request::{PageLimit, PageQuery, SortDirection};
use crate::error::{Result, StoreError, ValidationError};

/// Read side of the backing store as seen by the pagination engine.
///
/// `find_many` must return at most `query.take` rows matching the filter,
/// ordered by the resource's fully tie-broken order in `query.direction`,
/// starting strictly after the row identified by `query.after`. A cursor that
/// identifies no row yields no rows.
#[async_trait]
pub trait KeysetSource: Send + Sync {
    type Row: Send;
    type Filter: Send + Sync;
    type Cursor: Send + Sync;

    async fn find_many(
        &self,
        query: &PageQuery<Self::Filter, Self::Cursor>,
    ) -> Result<Vec<Self::Row>>;

    async fn count(&self, filter: &Self::Filter) -> Result<u64>;
}

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Paginates a collection ordered on a single-field cursor.
#[derive(Debug)]
pub struct SinglePageFetcher<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S> SinglePageFetcher<'a, S>
where
    S: KeysetSource<Cursor = CursorValue> + ?Sized,
    S::Row: CursorKeyed,
{
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    #[instrument(level = "debug", skip(self, filter), fields(limit = limit.get()))]
    pub async fn paginate(
        &self,
        filter: S::Filter,
        direction: SortDirection,
        cursor: Option<CursorValue>,
        limit: PageLimit,
    ) -> std::result::Result<Page<S::Row>, PaginationError> {
        let query = PageQuery {
            filter,
            direction,
            after: cursor,
            take: limit.fetch_size(),
        };
        let rows = self.source.find_many(&query).await?;
        Ok(PageAssembler::assemble(rows, limit, |row| row.cursor_key()))
    }

    /// Paginate and attach an independent count over the same filter.
    pub async fn paginate_with_total(
        &self,
        filter: S::Filter,
        direction: SortDirection,
        cursor: Option<CursorValue>,
        limit: PageLimit,
    ) -> std::result::Result<Page<S::Row>, PaginationError> {
        let total = self.source.count(&filter).await?;
        let page = self.paginate(filter, direction, cursor, limit).await?;
        Ok(page.with_total(total))
    }
}

/// Paginates a collection whose identity is a composite key. The cursor is
/// the complete key tuple of the previous page's last row.
#[derive(Debug)]
pub struct CompoundPageFetcher<'a, S: ?Sized> {
    source: &'a S,
    key: &'static CompositeKey,
}

impl<'a, S> CompoundPageFetcher<'a, S>
where
    S: KeysetSource<Cursor = CompoundCursor> + ?Sized,
    S::Row: CompoundKeyed,
{
    pub fn new(source: &'a S, key: &'static CompositeKey) -> Self {
        Self { source, key }
    }

    #[instrument(level = "debug", skip(self, filter, cursor), fields(limit = limit.get()))]
    pub async fn paginate(
        &self,
        filter: S::Filter,
        direction: SortDirection,
        cursor: Option<CompoundCursor>,
        limit: PageLimit,
    ) -> std::result::Result<Page<S::Row, CompoundCursor>, PaginationError> {
        if let Some(cursor) = &cursor {
            cursor.validate_against(self.key)?;
        }

        let query = PageQuery {
            filter,
            direction,
            after: cursor,
            take: limit.fetch_size(),
        };
        let rows = self.source.find_many(&query).await?;
        Ok(PageAssembler::assemble(rows, limit, |row| row.compound_key()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::cursor::{CursorKind, KeyPart};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        group: u8,
    }

    impl CursorKeyed for Row {
        fn cursor_key(&self) -> CursorValue {
            CursorValue::Int(self.id)
        }
    }

    /// Rows ordered by id; records every `take` it was asked for.
    struct VecSource {
        rows: Vec<Row>,
        takes: Mutex<Vec<usize>>,
    }

    impl VecSource {
        fn new(ids: impl IntoIterator<Item = i64>) -> Self {
            Self {
                rows: ids.into_iter().map(|id| Row { id, group: 1 }).collect(),
                takes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl KeysetSource for VecSource {
        type Row = Row;
        type Filter = u8;
        type Cursor = CursorValue;

        async fn find_many(&self, query: &PageQuery<u8, CursorValue>) -> Result<Vec<Row>> {
            self.takes.lock().unwrap().push(query.take);

            let mut rows: Vec<Row> = self
                .rows
                .iter()
                .filter(|row| row.group == query.filter)
                .cloned()
                .collect();
            rows.sort_by_key(|row| row.id);
            if query.direction == SortDirection::Desc {
                rows.reverse();
            }

            let start = match query.after.and_then(|cursor| cursor.as_i64()) {
                None => 0,
                Some(after) => match rows.iter().position(|row| row.id == after) {
                    Some(index) => index + 1,
                    None => return Ok(Vec::new()),
                },
            };

            Ok(rows.into_iter().skip(start).take(query.take).collect())
        }

        async fn count(&self, filter: &u8) -> Result<u64> {
            Ok(self.rows.iter().filter(|row| row.group == *filter).count() as u64)
        }
    }

    fn limit(n: u64) -> PageLimit {
        PageLimit::new(n, 50).expect("valid limit")
    }

    #[tokio::test]
    async fn newest_first_scenario_walks_two_pages() {
        let source = VecSource::new([1, 2, 3]);
        let fetcher = SinglePageFetcher::new(&source);

        let first = fetcher
            .paginate(1, SortDirection::Desc, None, limit(2))
            .await
            .expect("first page");
        let ids: Vec<i64> = first.data.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert!(first.has_more);
        assert_eq!(first.next_cursor, Some(CursorValue::Int(2)));

        let second = fetcher
            .paginate(1, SortDirection::Desc, first.next_cursor, limit(2))
            .await
            .expect("second page");
        let ids: Vec<i64> = second.data.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![1]);
        assert!(!second.has_more);
        assert_eq!(second.next_cursor, None);
    }

    #[tokio::test]
    async fn every_fetch_requests_limit_plus_one() {
        let source = VecSource::new(1..=10);
        let fetcher = SinglePageFetcher::new(&source);

        fetcher
            .paginate(1, SortDirection::Asc, None, limit(4))
            .await
            .expect("page");
        fetcher
            .paginate(1, SortDirection::Asc, Some(CursorValue::Int(4)), limit(7))
            .await
            .expect("page");

        assert_eq!(*source.takes.lock().unwrap(), vec![5, 8]);
    }

    #[tokio::test]
    async fn chained_pages_visit_every_row_once() {
        let source = VecSource::new(1..=23);
        let fetcher = SinglePageFetcher::new(&source);

        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let mut seen = Vec::new();
            let mut cursor = None;
            loop {
                let page = fetcher
                    .paginate(1, direction, cursor, limit(5))
                    .await
                    .expect("page");
                seen.extend(page.data.iter().map(|row| row.id));
                if !page.has_more {
                    break;
                }
                cursor = page.next_cursor;
            }

            let mut expected: Vec<i64> = (1..=23).collect();
            if direction == SortDirection::Desc {
                expected.reverse();
            }
            assert_eq!(seen, expected);
        }
    }

    #[tokio::test]
    async fn unknown_cursor_yields_empty_page() {
        let source = VecSource::new([1, 2, 3]);
        let page = SinglePageFetcher::new(&source)
            .paginate(1, SortDirection::Desc, Some(CursorValue::Int(99)), limit(2))
            .await
            .expect("page");

        assert!(page.data.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn total_is_an_independent_count() {
        let source = VecSource::new(1..=7);
        let page = SinglePageFetcher::new(&source)
            .paginate_with_total(1, SortDirection::Desc, None, limit(3))
            .await
            .expect("page");

        assert_eq!(page.data.len(), 3);
        assert_eq!(page.total, Some(7));
    }

    static PAIR: CompositeKey = CompositeKey::new(&[
        KeyPart {
            name: "a",
            kind: CursorKind::Int,
        },
        KeyPart {
            name: "b",
            kind: CursorKind::Int,
        },
    ]);

    #[derive(Debug, Clone, PartialEq)]
    struct PairRow {
        a: i64,
        b: i64,
    }

    impl CompoundKeyed for PairRow {
        fn compound_key(&self) -> CompoundCursor {
            CompoundCursor::new(
                &PAIR,
                [("a", CursorValue::Int(self.a)), ("b", CursorValue::Int(self.b))],
            )
            .expect("complete key")
        }
    }

    /// Rows ordered by `(a, b)` ascending.
    struct PairSource {
        rows: Vec<PairRow>,
    }

    #[async_trait]
    impl KeysetSource for PairSource {
        type Row = PairRow;
        type Filter = ();
        type Cursor = CompoundCursor;

        async fn find_many(&self, query: &PageQuery<(), CompoundCursor>) -> Result<Vec<PairRow>> {
            let mut rows = self.rows.clone();
            rows.sort_by_key(|row| (row.a, row.b));

            let bound = query.after.as_ref().map(|cursor| {
                (
                    cursor.get("a").and_then(|v| v.as_i64()).unwrap_or_default(),
                    cursor.get("b").and_then(|v| v.as_i64()).unwrap_or_default(),
                )
            });

            Ok(rows
                .into_iter()
                .filter(|row| bound.is_none_or(|bound| (row.a, row.b) > bound))
                .take(query.take)
                .collect())
        }

        async fn count(&self, _filter: &()) -> Result<u64> {
            Ok(self.rows.len() as u64)
        }
    }

    #[tokio::test]
    async fn compound_cursor_bounds_on_the_full_tuple() {
        // Rows sharing `a` with the cursor must still be returned when `b`
        // is past the cursor.
        let source = PairSource {
            rows: vec![
                PairRow { a: 1, b: 1 },
                PairRow { a: 1, b: 2 },
                PairRow { a: 1, b: 3 },
                PairRow { a: 2, b: 1 },
            ],
        };
        let fetcher = CompoundPageFetcher::new(&source, &PAIR);

        let first = fetcher
            .paginate((), SortDirection::Asc, None, limit(2))
            .await
            .expect("first page");
        assert_eq!(first.data, vec![PairRow { a: 1, b: 1 }, PairRow { a: 1, b: 2 }]);
        assert!(first.has_more);

        let second = fetcher
            .paginate((), SortDirection::Asc, first.next_cursor, limit(2))
            .await
            .expect("second page");
        assert_eq!(second.data, vec![PairRow { a: 1, b: 3 }, PairRow { a: 2, b: 1 }]);
        assert!(!second.has_more);
        assert_eq!(second.next_cursor, None);
    }

    static OTHER: CompositeKey = CompositeKey::new(&[KeyPart {
        name: "a",
        kind: CursorKind::Int,
    }]);

    #[tokio::test]
    async fn compound_cursor_for_a_different_key_is_rejected() {
        let source = PairSource { rows: Vec::new() };
        let partial = CompoundCursor::new(&OTHER, [("a", CursorValue::Int(1))]).expect("cursor");

        let err = CompoundPageFetcher::new(&source, &PAIR)
            .paginate((), SortDirection::Asc, Some(partial), limit(2))
            .await
            .expect_err("partial tuple");
        assert!(matches!(
            err,
            PaginationError::Validation(ValidationError::MissingCursorField { field: "b" })
        ));
    }
}
