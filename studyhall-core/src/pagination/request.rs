use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default and maximum page sizes observed by list endpoints.
pub const FEED_LIMITS: LimitPolicy = LimitPolicy::new(20, 50);
pub const COMMENT_LIMITS: LimitPolicy = LimitPolicy::new(20, 50);
pub const REPLY_LIMITS: LimitPolicy = LimitPolicy::new(10, 40);

/// A validated page size in `1..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageLimit(usize);

impl PageLimit {
    pub fn new(limit: u64, max: usize) -> Result<Self, ValidationError> {
        if limit == 0 {
            return Err(ValidationError::InvalidLimit {
                raw: limit.to_string(),
            });
        }
        if limit > max as u64 {
            return Err(ValidationError::LimitTooLarge { limit, max });
        }
        Ok(Self(limit as usize))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Rows to request from the store: one more than the page holds, so the
    /// presence of the extra row answers "is there more?".
    pub fn fetch_size(self) -> usize {
        self.0 + 1
    }
}

/// Per-endpoint bounds for the `limit` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPolicy {
    pub default: usize,
    pub max: usize,
}

impl LimitPolicy {
    pub const fn new(default: usize, max: usize) -> Self {
        Self { default, max }
    }

    /// Resolve a raw query-string limit. Missing means the default; anything
    /// that is not an integer in `1..=max` is a validation error.
    pub fn resolve(&self, raw: Option<&str>) -> Result<PageLimit, ValidationError> {
        let Some(raw) = raw else {
            return PageLimit::new(self.default as u64, self.max);
        };

        let trimmed = raw.trim();
        let parsed = trimmed
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidLimit {
                raw: trimmed.to_string(),
            })?;
        PageLimit::new(parsed, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Oldest first.
    Asc,
    /// Newest first.
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Comparison operator selecting rows strictly after a cursor row.
    pub fn after_operator(self) -> &'static str {
        match self {
            SortDirection::Asc => ">",
            SortDirection::Desc => "<",
        }
    }
}

/// Query descriptor handed to a store: filter, order, exclusive cursor bound
/// and the number of rows to read.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery<F, C> {
    pub filter: F,
    pub direction: SortDirection,
    pub after: Option<C>,
    pub take: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_limits_are_invalid() {
        assert!(matches!(
            FEED_LIMITS.resolve(Some("0")),
            Err(ValidationError::InvalidLimit { .. })
        ));
        assert!(matches!(
            FEED_LIMITS.resolve(Some("-3")),
            Err(ValidationError::InvalidLimit { .. })
        ));
        assert!(matches!(
            FEED_LIMITS.resolve(Some("ten")),
            Err(ValidationError::InvalidLimit { .. })
        ));
    }

    #[test]
    fn limit_above_endpoint_maximum_is_rejected() {
        assert_eq!(
            REPLY_LIMITS.resolve(Some("41")),
            Err(ValidationError::LimitTooLarge { limit: 41, max: 40 })
        );
        assert_eq!(REPLY_LIMITS.resolve(Some("40")).map(PageLimit::get), Ok(40));
        assert_eq!(FEED_LIMITS.resolve(Some("50")).map(PageLimit::get), Ok(50));
    }

    #[test]
    fn missing_limit_uses_default_and_overfetches_by_one() {
        let limit = COMMENT_LIMITS.resolve(None).expect("default limit");
        assert_eq!(limit.get(), 20);
        assert_eq!(limit.fetch_size(), 21);
    }
}
