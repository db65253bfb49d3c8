//! # Dataset Store Clients
//!
//! The dataset store is the remote service holding uploaded and cleaned
//! datasets. The core only reads from it: one page at a time for the table
//! view, one oversized page for reconciliation, and whole-dataset statistics.
use crate::dataset::{Dataset, Pagination, Row};
use crate::error::FetchError;
use crate::stats::DatasetStatistics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod http;
pub mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

/// Body of a paginated row read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    pub headers: Vec<String>,
    /// At most `pagination.page_size` rows
    pub data: Vec<Row>,
    pub pagination: Pagination,
}

impl PageResponse {
    /// Splits the response into the page's dataset and its pagination.
    pub fn into_parts(self) -> (Dataset, Pagination) {
        (Dataset::new(self.headers, self.data), self.pagination)
    }
}

/// Read access to named datasets.
///
/// Implementations do not retry and do not cache; every call reaches the
/// underlying store.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Reads 1-based `page` of `dataset` with `page_size` rows per page.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on transport failure, non-success status or an
    /// undecodable body.
    async fn read_page(
        &self,
        dataset: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PageResponse, FetchError>;

    /// Reads whole-dataset statistics.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] under the same conditions as [`DatasetStore::read_page`].
    async fn statistics(&self, dataset: &str) -> Result<DatasetStatistics, FetchError>;
}
