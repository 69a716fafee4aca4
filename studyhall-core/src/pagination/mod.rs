//! Cursor-based pagination engine.
//!
//! Every list endpoint goes through the same sequence: decode the caller's
//! cursor ([`CursorCodec`]), ask the store for `limit + 1` rows strictly
//! after it ([`SinglePageFetcher`] / [`CompoundPageFetcher`]), then let the
//! [`PageAssembler`] cut the page and derive `has_more` and `next_cursor`.

pub mod cursor;
pub mod fetcher;
pub mod page;
pub mod request;

pub use cursor::{
    CompositeKey, CompoundCursor, CursorCodec, CursorKind, CursorValue, KeyPart,
};
pub use fetcher::{CompoundPageFetcher, KeysetSource, PaginationError, SinglePageFetcher};
pub use page::{CompoundKeyed, CursorKeyed, Page, PageAssembler, PageEnvelope, PaginationMeta};
pub use request::{
    COMMENT_LIMITS, FEED_LIMITS, LimitPolicy, PageLimit, PageQuery, REPLY_LIMITS, SortDirection,
};
