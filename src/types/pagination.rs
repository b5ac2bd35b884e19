//! Paging arithmetic for paged reads.
//!
//! Requests are normalized, never rejected: a non-positive page size falls
//! back to a default, and a page number is forced to 1 when it is
//! non-positive or when the whole filtered set fits in one page.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_FILTERED_PAGE_SIZE, DEFAULT_PAGE_NUMBER, DEFAULT_UNFILTERED_PAGE_SIZE};

/// Stores bind offsets as signed 64-bit integers.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Requested page, 1-based. Values are taken as given and normalized later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page_number: i64,
    pub page_size: i64,
}

/// Normalized slice of a filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_number: u64,
    pub page_size: u64,
    pub offset: u64,
}

impl PageRequest {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// Requested size, or the default when it is not positive.
    ///
    /// Filtered reads default to 10 rows, unfiltered reads to 20.
    pub fn effective_page_size(&self, filtered: bool) -> u64 {
        if self.page_size > 0 {
            self.page_size as u64
        } else if filtered {
            DEFAULT_FILTERED_PAGE_SIZE
        } else {
            DEFAULT_UNFILTERED_PAGE_SIZE
        }
    }

    /// Window to read once the filtered row count is known.
    pub fn window(&self, page_size: u64, total_row_count: u64) -> PageWindow {
        let page_number = if total_row_count <= page_size || self.page_number <= 0 {
            DEFAULT_PAGE_NUMBER
        } else {
            self.page_number as u64
        };

        PageWindow {
            page_number,
            page_size,
            offset: (page_number - 1)
                .saturating_mul(page_size)
                .min(MAX_OFFSET),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER as i64,
            page_size: 0,
        }
    }
}

/// One page of records plus the row count of the whole filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total_row_count: u64,
    pub page_number: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, window: PageWindow, total_row_count: u64) -> Self {
        Self {
            records,
            total_row_count,
            page_number: window.page_number,
            page_size: window.page_size,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size > 0 {
            self.total_row_count.div_ceil(self.page_size)
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
