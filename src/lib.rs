//! # Tabular Dataset Inspector
//!
//! Client-side core for inspecting tabular datasets kept in a remote dataset
//! store. It pages through a dataset, searches the page on screen, and
//! reconciles an uploaded dataset against its cleaned counterpart.
//!
//! ## Features
//!
//! - **Column typing**: each column is numeric or categorical, decided by its
//!   first non-missing value
//! - **Reconciliation**: rows with a missing categorical value are discarded;
//!   missing numeric values of the remaining rows are filled with the row mean
//! - **Paging**: one materialized page at a time, never served from memory on
//!   revisit, with stale responses dropped
//! - **Search**: case-insensitive substring match over the current page only
//! - **Stores**: JSON over HTTP through `reqwest`, or an in-memory store
//!
//! ## Entry point
//!
//! [`Inspector`] ties the pieces together:
//!
//! - `get_page`: read one page and its pagination
//! - `search`: filter the materialized page
//! - `reconcile`: read two datasets concurrently and partition the cleaned one
pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod inspector;
pub mod reconcile;
pub mod search;
pub mod session;
pub mod stats;
pub mod store;

pub use cache::{PageCache, PageState, PageTicket, Settled};
pub use config::{ConfigError, InspectorConfig};
pub use dataset::{classify, CellValue, ColumnType, ColumnTypes, Dataset, Pagination, Row};
pub use error::{FetchError, FetchErrorKind, InspectorError};
pub use inspector::{Inspector, PageView};
pub use reconcile::{
    reconcile, DiscardedView, Inspection, ReconcileOptions, Reconciler, ReconciliationResult,
    ReconciliationSummary,
};
pub use search::{filter, filter_page, SearchCriteria};
pub use session::{ActiveDataset, PipelineStep, SessionContext};
pub use stats::DatasetStatistics;
pub use store::{DatasetStore, HttpStore, MemoryStore, PageResponse};
