//! In-memory dataset store.
//!
//! Serves whole datasets held in process, slicing pages with the same
//! arithmetic as the remote store. Useful for tests and offline hosts.
use super::{DatasetStore, PageResponse};
use crate::dataset::{Dataset, Pagination};
use crate::error::FetchError;
use crate::stats::DatasetStatistics;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A dataset store backed by a map of named datasets.
#[derive(Debug, Default)]
pub struct MemoryStore {
    datasets: HashMap<String, Dataset>,
    failures: HashMap<String, FetchError>,
    latency: Option<Duration>,
    requests: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `dataset` under `name`, replacing any previous one.
    pub fn with_dataset(mut self, name: impl Into<String>, dataset: Dataset) -> Self {
        self.datasets.insert(name.into(), dataset);
        self
    }

    /// Makes every read of `name` fail with `error`.
    pub fn with_failure(mut self, name: impl Into<String>, error: FetchError) -> Self {
        self.failures.insert(name.into(), error);
        self
    }

    /// Delays every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of reads served or refused so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    async fn lookup(&self, name: &str) -> Result<&Dataset, FetchError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = self.failures.get(name) {
            return Err(error.clone());
        }
        self.datasets
            .get(name)
            .ok_or_else(|| FetchError::status(404, format!("Dataset '{}' not found", name)))
    }
}

#[async_trait]
impl DatasetStore for MemoryStore {
    async fn read_page(
        &self,
        dataset: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PageResponse, FetchError> {
        let source = self.lookup(dataset).await?;
        let pagination = Pagination::new(page, page_size, source.len() as u64);
        if page == 0 || page_size == 0 {
            return Err(FetchError::status(422, format!("Invalid page {} of size {}", page, page_size)));
        }

        let data = usize::try_from(pagination.offset())
            .map(|offset| {
                source
                    .rows
                    .iter()
                    .skip(offset)
                    .take(pagination.page_size as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(PageResponse { headers: source.headers.clone(), data, pagination })
    }

    async fn statistics(&self, dataset: &str) -> Result<DatasetStatistics, FetchError> {
        let source = self.lookup(dataset).await?;
        Ok(DatasetStatistics::compute(source))
    }
}
