//! Holds the single materialized page of the active dataset.
//!
//! A page request always starts from scratch: [`PageCache::begin`] drops the
//! current rows before the next ones arrive, and previously visited pages are
//! never served from memory. Responses are matched to requests by ticket so a
//! slow response for an older request cannot overwrite a newer page.
use crate::dataset::{Dataset, Pagination, Row};
use crate::error::{FetchError, InspectorError};
use crate::store::PageResponse;
use log::{debug, warn};

/// Identifies one issued page request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageTicket {
    sequence: u64,
    pub dataset: String,
    pub page: u32,
    pub page_size: u32,
}

impl PageTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Lifecycle of the materialized page.
#[derive(Clone, Debug, PartialEq)]
pub enum PageState {
    /// Nothing requested yet
    Idle,
    /// Waiting for the response to `sequence`
    Loading { sequence: u64 },
    /// Page rows are available
    Ready { page: Dataset, pagination: Pagination },
    /// The last request failed
    Failed { error: FetchError },
}

/// Whether a response was applied by [`PageCache::settle`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Settled {
    Applied,
    /// A newer request was issued after this one; the response was dropped.
    Stale,
}

/// The page currently shown for one dataset.
#[derive(Debug)]
pub struct PageCache {
    /// Dataset the cache belongs to
    dataset: Option<String>,
    /// Page size of the remembered pagination
    page_size: u32,
    /// Pagination of the last successful read, kept across failures
    pagination: Option<Pagination>,
    state: PageState,
    /// Sequence number of the latest issued ticket
    issued: u64,
    last_request: Option<PageTicket>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCache {
    pub fn new() -> Self {
        Self {
            dataset: None,
            page_size: 0,
            pagination: None,
            state: PageState::Idle,
            issued: 0,
            last_request: None,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    /// Pagination of the last successful read of the current dataset and page size.
    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// The last issued request, for a caller-driven retry.
    pub fn last_request(&self) -> Option<&PageTicket> {
        self.last_request.as_ref()
    }

    /// The materialized page, if one is ready.
    pub fn page(&self) -> Option<&Dataset> {
        match &self.state {
            PageState::Ready { page, .. } => Some(page),
            _ => None,
        }
    }

    /// Rows of the materialized page; empty while loading or after a failure.
    pub fn rows(&self) -> &[Row] {
        self.page().map(|page| page.rows.as_slice()).unwrap_or(&[])
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PageState::Loading { .. })
    }

    /// Checks that `page` may be requested for `dataset` with `page_size`.
    ///
    /// Pages start at 1. The upper bound is only known once a page of the same
    /// dataset and page size has been read.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::InvalidPageSize`] or [`InspectorError::PageOutOfRange`].
    pub fn check_bounds(&self, dataset: &str, page: u32, page_size: u32) -> Result<(), InspectorError> {
        if page_size == 0 {
            return Err(InspectorError::InvalidPageSize);
        }
        let known = self
            .pagination
            .filter(|_| self.dataset.as_deref() == Some(dataset) && self.page_size == page_size);
        let in_range = match known {
            Some(pagination) => pagination.contains(page),
            None => page >= 1,
        };
        if in_range {
            Ok(())
        } else {
            Err(InspectorError::PageOutOfRange {
                page,
                total_pages: known.map(|pagination| pagination.total_pages).unwrap_or(0),
            })
        }
    }

    /// Starts a page request and drops the current rows.
    ///
    /// Switching dataset or page size also forgets the remembered pagination.
    pub fn begin(&mut self, dataset: &str, page: u32, page_size: u32) -> PageTicket {
        if self.dataset.as_deref() != Some(dataset) || self.page_size != page_size {
            debug!("Page cache reset for '{}' with page size {}", dataset, page_size);
            self.dataset = Some(dataset.to_owned());
            self.page_size = page_size;
            self.pagination = None;
        }

        self.issued += 1;
        self.state = PageState::Loading { sequence: self.issued };
        let ticket = PageTicket {
            sequence: self.issued,
            dataset: dataset.to_owned(),
            page,
            page_size,
        };
        debug!("Loading page {} of '{}' (request #{})", page, dataset, ticket.sequence);
        self.last_request = Some(ticket.clone());
        ticket
    }

    /// Applies the response for `ticket` unless a newer request was issued since.
    pub fn settle(&mut self, ticket: &PageTicket, result: Result<PageResponse, FetchError>) -> Settled {
        if ticket.sequence != self.issued || !self.is_loading() {
            warn!(
                "Dropping stale response for page {} of '{}' (request #{}, latest #{})",
                ticket.page, ticket.dataset, ticket.sequence, self.issued
            );
            return Settled::Stale;
        }

        self.state = match result {
            Ok(response) => {
                let (page, mut pagination) = response.into_parts();
                if !pagination.is_consistent() {
                    warn!("Store returned inconsistent pagination for '{}': {:?}", ticket.dataset, pagination);
                    pagination.page_size = pagination.page_size.max(1);
                    pagination.total_pages = Pagination::total_pages_for(pagination.total_rows, pagination.page_size);
                }
                self.pagination = Some(pagination);
                PageState::Ready { page, pagination }
            }
            Err(error) => {
                debug!("Page {} of '{}' failed: {}", ticket.page, ticket.dataset, error);
                PageState::Failed { error }
            }
        };
        Settled::Applied
    }

    /// Forgets everything, as when the session ends.
    pub fn reset(&mut self) {
        let issued = self.issued;
        *self = Self::new();
        self.issued = issued;
    }
}
