//! # Configuration
//!
//! Runtime settings of the inspector, read from named parameters. Each
//! parameter knows its variable name, its fallback and how to parse itself.
use crate::config::ConfigError::InvalidParameter;
use crate::reconcile::{DiscardedView, ReconcileOptions};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while reading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A parameter was present but could not be used
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },
}

/// Where raw parameter values come from.
pub trait ParamSource {
    /// Returns the raw value of `name`, or `None` when it is not set.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads parameters from the process environment.
#[derive(Copy, Clone, Debug, Default)]
pub struct EnvSource;

impl ParamSource for EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl ParamSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// A single named configuration parameter.
///
/// # Type Parameters
///
/// * `T` - The type of the parameter value
pub trait NamedParam<T> {
    /// Returns the variable name
    fn name() -> &'static str;

    /// Returns the value used when the variable is unset or blank
    fn fallback() -> T;

    /// Parses a non-blank raw value
    fn parse(raw: &str) -> Result<T, String>;

    /// Reads the parameter from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] when the value is present but unusable.
    fn read(source: &impl ParamSource) -> Result<T, ConfigError> {
        match source.get(Self::name()) {
            Some(raw) if !raw.trim().is_empty() => Self::parse(raw.trim()).map_err(|message| InvalidParameter {
                name: Self::name().to_string(),
                message,
            }),
            _ => Ok(Self::fallback()),
        }
    }
}

/// Store base URL parameter handler
struct StoreUrlParam;

/// Interactive page size parameter handler
struct PageSizeParam;

/// Full read page size parameter handler
struct FullReadPageSizeParam;

/// Request timeout parameter handler
struct RequestTimeoutParam;

/// Identifier column parameter handler
struct IdentifierColumnParam;

/// Discarded view parameter handler
struct DiscardedViewParam;

const DEFAULT_STORE_URL: &str = "http://localhost:8000/";

fn parse_positive(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(value) => Ok(value),
        Err(error) => Err(format!("'{}' is not a positive integer: {}", raw, error)),
    }
}

impl NamedParam<Url> for StoreUrlParam {
    fn name() -> &'static str {
        "INSPECTOR_STORE_URL"
    }

    fn fallback() -> Url {
        Url::parse(DEFAULT_STORE_URL).expect("Hardcode store url")
    }

    fn parse(raw: &str) -> Result<Url, String> {
        let url = Url::parse(raw).map_err(|error| format!("'{}' is not a URL: {}", raw, error))?;
        if url.cannot_be_a_base() {
            return Err(format!("'{}' cannot be used as a base URL", raw));
        }
        Ok(url)
    }
}

impl NamedParam<u32> for PageSizeParam {
    fn name() -> &'static str {
        "INSPECTOR_PAGE_SIZE"
    }

    fn fallback() -> u32 {
        50
    }

    fn parse(raw: &str) -> Result<u32, String> {
        parse_positive(raw)
    }
}

impl NamedParam<u32> for FullReadPageSizeParam {
    fn name() -> &'static str {
        "INSPECTOR_FULL_READ_PAGE_SIZE"
    }

    fn fallback() -> u32 {
        100_000
    }

    fn parse(raw: &str) -> Result<u32, String> {
        parse_positive(raw)
    }
}

impl NamedParam<Duration> for RequestTimeoutParam {
    fn name() -> &'static str {
        "INSPECTOR_REQUEST_TIMEOUT_SECS"
    }

    fn fallback() -> Duration {
        Duration::from_secs(30)
    }

    fn parse(raw: &str) -> Result<Duration, String> {
        parse_positive(raw).map(|seconds| Duration::from_secs(u64::from(seconds)))
    }
}

impl NamedParam<Option<String>> for IdentifierColumnParam {
    fn name() -> &'static str {
        "INSPECTOR_ID_COLUMN"
    }

    fn fallback() -> Option<String> {
        None
    }

    fn parse(raw: &str) -> Result<Option<String>, String> {
        Ok(Some(raw.to_string()))
    }
}

impl NamedParam<DiscardedView> for DiscardedViewParam {
    fn name() -> &'static str {
        "INSPECTOR_DISCARDED_VIEW"
    }

    fn fallback() -> DiscardedView {
        DiscardedView::Full
    }

    fn parse(raw: &str) -> Result<DiscardedView, String> {
        DiscardedView::parse(raw).ok_or_else(|| format!("unknown view '{}', expected 'full' or 'projected'", raw))
    }
}

/// Settings shared by every inspector operation.
#[derive(Clone, Debug, PartialEq)]
pub struct InspectorConfig {
    /// Base URL of the dataset store
    pub store_url: Url,
    /// Rows per interactive page
    pub page_size: u32,
    /// Page size used to pull a whole dataset in one read
    pub full_read_page_size: u32,
    /// Upper bound for every store call
    pub request_timeout: Duration,
    pub identifier_column: Option<String>,
    pub discarded_view: DiscardedView,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            store_url: StoreUrlParam::fallback(),
            page_size: PageSizeParam::fallback(),
            full_read_page_size: FullReadPageSizeParam::fallback(),
            request_timeout: RequestTimeoutParam::fallback(),
            identifier_column: IdentifierColumnParam::fallback(),
            discarded_view: DiscardedViewParam::fallback(),
        }
    }
}

impl InspectorConfig {
    /// Reads every parameter from `source`, falling back to defaults for unset ones.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn load(source: &impl ParamSource) -> Result<Self, ConfigError> {
        Ok(Self {
            store_url: StoreUrlParam::read(source)?,
            page_size: PageSizeParam::read(source)?,
            full_read_page_size: FullReadPageSizeParam::read(source)?,
            request_timeout: RequestTimeoutParam::read(source)?,
            identifier_column: IdentifierColumnParam::read(source)?,
            discarded_view: DiscardedViewParam::read(source)?,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&EnvSource)
    }

    /// Reconciliation options derived from this configuration.
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            identifier_column: self.identifier_column.clone(),
            discarded_view: self.discarded_view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(name, value)| (name.to_string(), value.to_string())).collect()
    }

    #[test]
    fn defaults_when_unset() {
        let config = InspectorConfig::load(&source(&[])).unwrap();
        assert_eq!(config, InspectorConfig::default());
        assert_eq!(config.store_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.full_read_page_size, 100_000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.identifier_column, None);
        assert_eq!(config.discarded_view, DiscardedView::Full);
    }

    #[test]
    fn reads_every_parameter() {
        let config = InspectorConfig::load(&source(&[
            ("INSPECTOR_STORE_URL", "https://store.example.com/api/"),
            ("INSPECTOR_PAGE_SIZE", "25"),
            ("INSPECTOR_FULL_READ_PAGE_SIZE", "5000"),
            ("INSPECTOR_REQUEST_TIMEOUT_SECS", " 5 "),
            ("INSPECTOR_ID_COLUMN", "id"),
            ("INSPECTOR_DISCARDED_VIEW", "projected"),
        ]))
        .unwrap();

        assert_eq!(config.store_url.as_str(), "https://store.example.com/api/");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.full_read_page_size, 5000);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(
            config.reconcile_options(),
            ReconcileOptions { identifier_column: Some("id".into()), discarded_view: DiscardedView::Projected }
        );
    }

    #[test]
    fn blank_value_falls_back() {
        let config = InspectorConfig::load(&source(&[("INSPECTOR_PAGE_SIZE", "  "), ("INSPECTOR_ID_COLUMN", "")])).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.identifier_column, None);
    }

    #[test]
    fn rejects_zero_page_size() {
        let error = InspectorConfig::load(&source(&[("INSPECTOR_PAGE_SIZE", "0")])).unwrap_err();
        assert_eq!(
            error,
            InvalidParameter { name: "INSPECTOR_PAGE_SIZE".into(), message: "must be at least 1".into() }
        );
    }

    #[test]
    fn rejects_malformed_values() {
        for (name, value) in [
            ("INSPECTOR_STORE_URL", "not a url"),
            ("INSPECTOR_STORE_URL", "mailto:someone@example.com"),
            ("INSPECTOR_FULL_READ_PAGE_SIZE", "-3"),
            ("INSPECTOR_REQUEST_TIMEOUT_SECS", "0"),
            ("INSPECTOR_DISCARDED_VIEW", "sideways"),
        ] {
            match InspectorConfig::load(&source(&[(name, value)])) {
                Err(InvalidParameter { name: reported, .. }) => assert_eq!(reported, name),
                other => panic!("expected {} = {:?} to be rejected, got {:?}", name, value, other),
            }
        }
    }
}
