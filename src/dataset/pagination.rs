use serde::{Deserialize, Serialize};

/// Pagination metadata attached to every page read.
///
/// `total_pages` is `ceil(total_rows / page_size)`, and never less than 1 so an
/// empty dataset still has a (blank) first page.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    pub current_page: u32,
    pub total_pages: u32,
    pub total_rows: u64,
    pub page_size: u32,
}

impl Pagination {
    /// Builds the metadata for `current_page` of a dataset holding `total_rows`.
    /// `page_size` of zero is treated as one.
    pub fn new(current_page: u32, page_size: u32, total_rows: u64) -> Self {
        let page_size = page_size.max(1);
        Self {
            current_page,
            total_pages: Self::total_pages_for(total_rows, page_size),
            total_rows,
            page_size,
        }
    }

    /// Number of pages needed for `total_rows`, at least 1.
    pub fn total_pages_for(total_rows: u64, page_size: u32) -> u32 {
        let pages = total_rows.div_ceil(u64::from(page_size.max(1))).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Checks if `page` may be requested under this pagination.
    pub fn contains(&self, page: u32) -> bool {
        1 <= page && page <= self.total_pages
    }

    /// Index of the first row of the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.current_page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then(|| self.current_page + 1)
    }

    pub fn previous_page(&self) -> Option<u32> {
        self.has_previous().then(|| self.current_page - 1)
    }

    /// Returns true if the fields agree with each other.
    pub fn is_consistent(&self) -> bool {
        self.page_size >= 1
            && self.total_pages == Self::total_pages_for(self.total_rows, self.page_size)
            && (self.total_rows == 0 || self.contains(self.current_page))
    }
}

impl Default for Pagination {
    /// First page of an empty dataset.
    fn default() -> Self {
        Pagination::new(1, 1, 0)
    }
}
