//! # Inspector
//!
//! Entry point for the rendering layer. Reads pages through the
//! [`PageCache`], searches the materialized page, and reconciles an original
//! dataset against its cleaned counterpart.
use crate::cache::{PageCache, PageState, PageTicket, Settled};
use crate::config::InspectorConfig;
use crate::dataset::{Dataset, Pagination, Row};
use crate::error::{FetchError, InspectorError, ResultMessage};
use crate::reconcile::{Inspection, Reconciler};
use crate::search::filter_page;
use crate::session::SessionContext;
use crate::stats::DatasetStatistics;
use crate::store::{DatasetStore, HttpStore};
use anyhow::{Context, Result};
use log::{debug, info};
use std::future::Future;
use std::time::Duration;

/// A page as handed to the table view.
#[derive(Clone, Debug, PartialEq)]
pub struct PageView<'a> {
    pub headers: &'a [String],
    pub rows: &'a [Row],
    pub pagination: Pagination,
}

/// Bounds `call` by `timeout`, turning an elapsed deadline into a timeout [`FetchError`].
async fn bounded<T, F>(timeout: Duration, what: &str, call: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.with_prefix(what),
        Err(_) => Err(FetchError::timeout(format!("{}: no response within {:?}", what, timeout))),
    }
}

pub struct Inspector<S: DatasetStore> {
    store: S,
    config: InspectorConfig,
    cache: PageCache,
    reconciler: Reconciler,
}

impl Inspector<HttpStore> {
    /// Builds an inspector talking to the store named by the environment.
    pub fn from_env() -> Result<Self> {
        let config = InspectorConfig::from_env().context("Failed to read inspector configuration")?;
        let store = HttpStore::new(config.store_url.clone(), config.request_timeout)
            .with_context(|| format!("Failed to create store client for {}", config.store_url))?;
        info!("Inspector using dataset store at {}", config.store_url);
        Ok(Self::new(store, config))
    }
}

impl<S: DatasetStore> Inspector<S> {
    pub fn new(store: S, config: InspectorConfig) -> Self {
        let reconciler = Reconciler::new(config.reconcile_options());
        Self { store, config, cache: PageCache::new(), reconciler }
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Reads `page` of `dataset` and makes it the materialized page.
    ///
    /// The current rows are dropped before the read starts; a revisited page
    /// is read again. On failure the previous pagination is kept so the pager
    /// stays where it was.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::InvalidPageSize`] or [`InspectorError::PageOutOfRange`]
    /// without contacting the store, and [`InspectorError::Fetch`] when the read fails.
    pub async fn get_page(
        &mut self,
        dataset: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PageView<'_>, InspectorError> {
        self.cache.check_bounds(dataset, page, page_size)?;

        let ticket = self.cache.begin(dataset, page, page_size);
        let what = format!("Read page {} of '{}'", page, dataset);
        let result = bounded(
            self.config.request_timeout,
            &what,
            self.store.read_page(dataset, page, page_size),
        )
        .await;
        let settled = self.cache.settle(&ticket, result);
        self.view(&ticket, settled)
    }

    /// The outcome of `ticket` once the cache has settled it.
    ///
    /// `get_page` holds `&mut self` across the read, so its own ticket is
    /// always the latest; a stale ticket only arises when requests are
    /// interleaved on the cache directly.
    fn view(&self, ticket: &PageTicket, settled: Settled) -> Result<PageView<'_>, InspectorError> {
        match (settled, self.cache.state()) {
            (Settled::Applied, PageState::Ready { page, pagination }) => Ok(PageView {
                headers: &page.headers,
                rows: &page.rows,
                pagination: *pagination,
            }),
            (Settled::Applied, PageState::Failed { error }) => Err(error.clone().into()),
            _ => Err(InspectorError::Superseded { dataset: ticket.dataset.clone(), page: ticket.page }),
        }
    }

    /// Reads `page` of the session's active dataset with the configured page size.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::NoActiveDataset`] without an active dataset,
    /// otherwise as [`Inspector::get_page`].
    pub async fn get_page_for(
        &mut self,
        session: &SessionContext,
        page: u32,
    ) -> Result<PageView<'_>, InspectorError> {
        let dataset = session.active().ok_or(InspectorError::NoActiveDataset)?.id().to_owned();
        let page_size = self.config.page_size;
        self.get_page(&dataset, page, page_size).await
    }

    /// Re-issues the last page request. Returns `None` when nothing was requested yet.
    pub async fn retry(&mut self) -> Option<Result<PageView<'_>, InspectorError>> {
        let ticket = self.cache.last_request()?.clone();
        debug!("Retrying page {} of '{}'", ticket.page, ticket.dataset);
        Some(self.get_page(&ticket.dataset, ticket.page, ticket.page_size).await)
    }

    /// Rows of the materialized page containing `query` in a displayed column.
    /// Never reaches the store.
    pub fn search(&self, query: &str) -> Vec<&Row> {
        self.cache.page().map(|page| filter_page(page, query)).unwrap_or_default()
    }

    /// Reads a whole dataset as one oversized page.
    ///
    /// # Errors
    ///
    /// Returns [`InspectorError::TruncatedRead`] when the dataset does not fit in
    /// one read, so a partial dataset is never reconciled.
    async fn read_full(&self, dataset: &str) -> Result<Dataset, InspectorError> {
        let page_size = self.config.full_read_page_size;
        let what = format!("Read dataset '{}'", dataset);
        let response = bounded(
            self.config.request_timeout,
            &what,
            self.store.read_page(dataset, 1, page_size),
        )
        .await?;
        let total_rows = response.pagination.total_rows;
        if response.data.len() as u64 != total_rows {
            return Err(InspectorError::TruncatedRead { dataset: dataset.to_owned(), total_rows, page_size });
        }
        Ok(response.into_parts().0)
    }

    /// Reads both datasets concurrently and reconciles them.
    ///
    /// # Errors
    ///
    /// Fails as a whole when either read fails or is truncated, or with
    /// [`InspectorError::IncompatibleSchema`] when the cleaned dataset has no headers.
    pub async fn reconcile(&self, original: &str, cleaned: &str) -> Result<Inspection, InspectorError> {
        debug!("Reconciling '{}' against '{}'", cleaned, original);
        let (original, cleaned) = tokio::try_join!(self.read_full(original), self.read_full(cleaned))?;
        self.reconciler.reconcile(original, &cleaned)
    }

    /// Reconciles the session's active dataset against its recorded cleaned dataset.
    pub async fn reconcile_session(&self, session: &SessionContext) -> Result<Inspection, InspectorError> {
        let (original, cleaned) = session.reconcile_pair()?;
        self.reconcile(original, cleaned).await
    }

    pub async fn statistics(&self, dataset: &str) -> Result<DatasetStatistics, InspectorError> {
        let what = format!("Read statistics of '{}'", dataset);
        Ok(bounded(self.config.request_timeout, &what, self.store.statistics(dataset)).await?)
    }
}
