use thiserror::Error;

/// Failures raised by a backing store adapter.
///
/// Services pass these through untouched; the HTTP layer decides how to
/// present them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Malformed caller input detected before any store access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("limit must be a positive integer, got {raw:?}")]
    InvalidLimit { raw: String },

    #[error("limit {limit} exceeds the maximum of {max}")]
    LimitTooLarge { limit: u64, max: usize },

    #[error("cursor token is empty")]
    EmptyCursor,

    #[error("cursor token exceeds max length: {len} chars (max {max})")]
    CursorTooLong { len: usize, max: usize },

    #[error("cursor {raw:?} is not a valid {expected}")]
    InvalidCursor { raw: String, expected: &'static str },

    #[error("compound cursor is missing field `{field}`")]
    MissingCursorField { field: &'static str },

    #[error("compound cursor has unknown field `{field}`")]
    UnknownCursorField { field: String },

    #[error("{field} must be between {min} and {max} characters")]
    FieldLength {
        field: &'static str,
        min: usize,
        max: usize,
    },
}
