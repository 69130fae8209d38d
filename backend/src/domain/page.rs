//! Offset/limit pagination for listing queries.

use thiserror::Error;

/// Validation errors raised by [`Page::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageValidationError {
    /// Offsets count skipped rows and cannot be negative.
    #[error("page offset must not be negative, got {0}")]
    NegativeOffset(i64),
    /// A zero or negative limit would return nothing forever.
    #[error("page limit must be positive, got {0}")]
    NonPositiveLimit(i64),
}

/// A validated `(offset, limit)` slice of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    offset: i64,
    limit: i64,
}

impl Page {
    /// Default page size when the caller does not specify one.
    pub const DEFAULT_LIMIT: i64 = 20;

    /// Construct a page, rejecting negative offsets and non-positive limits.
    pub fn new(offset: i64, limit: i64) -> Result<Self, PageValidationError> {
        if offset < 0 {
            return Err(PageValidationError::NegativeOffset(offset));
        }
        if limit <= 0 {
            return Err(PageValidationError::NonPositiveLimit(limit));
        }
        Ok(Self { offset, limit })
    }

    /// Number of leading rows to skip.
    #[must_use]
    pub const fn offset(self) -> i64 {
        self.offset
    }

    /// Maximum number of rows to return.
    #[must_use]
    pub const fn limit(self) -> i64 {
        self.limit
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
