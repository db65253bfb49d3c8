//! HTTP/JSON dataset store client.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET data/{dataset}?page=P&page_size=N` returns a [`PageResponse`]
//! - `GET stats/{dataset}` returns [`DatasetStatistics`]
use super::{DatasetStore, PageResponse};
use crate::error::{FetchError, InspectorError};
use crate::stats::DatasetStatistics;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Dataset store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    /// Creates a client for the store at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, InspectorError> {
        let client = Client::builder()
            .user_agent(concat!("tabular-inspector/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, base_url: Self::as_directory(base_url) })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensures the path ends with `/` so endpoints append instead of replacing the last segment.
    fn as_directory(mut url: Url) -> Url {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url
    }

    /// Builds `{base}/{endpoint}/{dataset}`, encoding the dataset id as one path segment.
    pub(crate) fn endpoint(&self, endpoint: &str, dataset: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::transport(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(endpoint)
            .push(dataset);
        Ok(url)
    }

    pub(crate) fn page_url(&self, dataset: &str, page: u32, page_size: u32) -> Result<Url, FetchError> {
        let mut url = self.endpoint("data", dataset)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &page_size.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(format!("HTTP GET timed out for '{}'", url))
            } else {
                FetchError::transport(format!("HTTP GET error for '{}': {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(
                status.as_u16(),
                format!("HTTP GET failed for '{}': status {}", url, status),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(format!("HTTP body timed out for '{}'", url))
            } else {
                FetchError::decode(format!("Invalid response body from '{}': {}", url, e))
            }
        })
    }
}

#[async_trait]
impl DatasetStore for HttpStore {
    async fn read_page(
        &self,
        dataset: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PageResponse, FetchError> {
        let url = self.page_url(dataset, page, page_size)?;
        self.get_json(url).await
    }

    async fn statistics(&self, dataset: &str) -> Result<DatasetStatistics, FetchError> {
        let url = self.endpoint("stats", dataset)?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;

    fn store(base: &str) -> HttpStore {
        HttpStore::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn page_url_layout() {
        let url = store("http://localhost:8000").page_url("sales.csv", 2, 50).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/data/sales.csv?page=2&page_size=50");
    }

    #[test]
    fn keeps_base_path() {
        let url = store("http://host/api/v1").endpoint("stats", "x.csv").unwrap();
        assert_eq!(url.as_str(), "http://host/api/v1/stats/x.csv");
        let url = store("http://host/api/v1/").endpoint("stats", "x.csv").unwrap();
        assert_eq!(url.as_str(), "http://host/api/v1/stats/x.csv");
    }

    #[test]
    fn dataset_id_is_one_segment() {
        let url = store("http://host/").endpoint("data", "20240101_120000_my data/../x.csv").unwrap();
        assert_eq!(url.path(), "/data/20240101_120000_my%20data%2F..%2Fx.csv");
    }

    #[test]
    fn rejects_non_hierarchical_base() {
        let store = store("mailto:someone@example.com");
        let error = store.endpoint("data", "x").unwrap_err();
        assert_eq!(error.kind, FetchErrorKind::Transport);
    }

    #[tokio::test]
    async fn unreachable_store_is_fetch_error() {
        let store = store("http://127.0.0.1:9/");
        let error = store.read_page("x.csv", 1, 10).await.unwrap_err();
        assert!(matches!(error.kind, FetchErrorKind::Transport | FetchErrorKind::Timeout));
    }
}
