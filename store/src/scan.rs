//! Ordering and pagination parameters for range scans.

use std::ops::Bound;

use thiserror::Error;

/// Scan direction over a collection's ordering key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

impl Order {
    pub fn from_desc(desc: bool) -> Self {
        if desc {
            Order::Descending
        } else {
            Order::Ascending
        }
    }
}

/// Offset/limit window applied inside the storage engine.
///
/// No cursor state is kept between calls; a caller paging through a collection
/// that is being written to concurrently may see shifted windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("offset must be non-negative, got {0}")]
    NegativeOffset(i64),

    #[error("limit must be non-negative, got {0}")]
    NegativeLimit(i64),
}

impl Page {
    /// Everything from the start.
    pub const ALL: Self = Self {
        offset: 0,
        limit: usize::MAX,
    };

    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Build a page from signed inputs as received from an outer surface.
    pub fn from_signed(offset: i64, limit: i64) -> Result<Self, PageError> {
        if offset < 0 {
            return Err(PageError::NegativeOffset(offset));
        }
        if limit < 0 {
            return Err(PageError::NegativeLimit(limit));
        }
        Ok(Self {
            offset: usize::try_from(offset).unwrap_or(usize::MAX),
            limit: usize::try_from(limit).unwrap_or(usize::MAX),
        })
    }

    /// Apply this window to an already ordered iterator.
    pub fn apply<I: Iterator>(&self, iter: I) -> std::iter::Take<std::iter::Skip<I>> {
        iter.skip(self.offset).take(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::ALL
    }
}

/// Smallest key strictly greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (empty prefix or all `0xff`), in
/// which case the range is unbounded above.
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.pop() {
        if last < u8::MAX {
            upper.push(last + 1);
            return Some(upper);
        }
    }
    None
}

/// Bounds covering exactly the keys that start with `prefix`.
pub fn prefix_bounds(prefix: &[u8]) -> (Bound<Vec<u8>>, Bound<Vec<u8>>) {
    let lower = if prefix.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(prefix.to_vec())
    };
    let upper = match prefix_upper_bound(prefix) {
        Some(upper) => Bound::Excluded(upper),
        None => Bound::Unbounded,
    };
    (lower, upper)
}
