//! Offset-based pagination for list endpoints.

use serde::{Deserialize, Serialize};

use explorer_index::{IndexError, Order, Page};

/// Default page size when `limit` is not specified.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Maximum allowed page size.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Common query parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Newest (highest height / nonce) first.
    pub desc: Option<bool>,
    pub offset: Option<i64>,
    /// Number of items per page (default 100, max 1000).
    pub limit: Option<i64>,
}

impl ListParams {
    pub fn order(&self) -> Order {
        Order::from_desc(self.desc.unwrap_or(false))
    }

    /// Validate into a storage page. Negative values are rejected; an
    /// oversized limit is clamped to [`MAX_PAGE_SIZE`].
    pub fn page(&self) -> Result<Page, IndexError> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let page = Page::from_signed(offset, limit)?;
        Ok(Page::new(page.offset, page.limit.min(MAX_PAGE_SIZE as usize)))
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub offset: usize,
    pub limit: usize,
    /// Offset to request for the next page, or `None` on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<usize>,
}

impl PageMeta {
    pub fn new(page: Page, returned: usize) -> Self {
        Self {
            offset: page.offset,
            limit: page.limit,
            next_offset: next_offset(page, returned),
        }
    }
}

/// A full page means there may be more; a short one means the end.
pub fn next_offset(page: Page, returned: usize) -> Option<usize> {
    if page.limit == 0 || returned < page.limit {
        None
    } else {
        Some(page.offset.saturating_add(returned))
    }
}
