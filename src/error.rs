use thiserror::Error;

/// Main error type for the inspector.
/// Aggregates store failures, schema problems, pagination misuse and configuration errors.
#[derive(Error, Debug)]
pub enum InspectorError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("Incompatible schema: {reason}")]
    IncompatibleSchema { reason: String },

    #[error("Page {page} is outside of 1..={total_pages}")]
    PageOutOfRange { page: u32, total_pages: u32 },

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("No active dataset in session")]
    NoActiveDataset,

    #[error("Dataset '{dataset}' has {total_rows} rows, more than one read of {page_size} can hold")]
    TruncatedRead { dataset: String, total_rows: u64, page_size: u32 },

    #[error("Page {page} of '{dataset}' was superseded by a newer request")]
    Superseded { dataset: String, page: u32 },

    #[error("{0}")]
    Config(#[from] crate::config::ConfigError),

    // Third-party library errors
    #[error("{0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl InspectorError {
    /// Returns true when the failure came from talking to the dataset store.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, InspectorError::Fetch(_))
    }
}

/// Category of a dataset store failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connection refused, DNS failure, reset, ...
    Transport,
    /// The store answered with a non-success HTTP status.
    Status(u16),
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The response body was not the expected JSON shape.
    Decode,
}

/// Failure while reading from the dataset store.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Transport, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Status(status), message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Timeout, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Decode, message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, FetchError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| FetchError {
            kind: e.kind,
            message: format!("{}: {}", message, e.message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_keeps_kind() {
        let result: Result<(), FetchError> = Err(FetchError::status(503, "service unavailable"));
        let error = result.with_prefix("read page 2 of 'sales.csv'").unwrap_err();

        assert_eq!(error.kind, FetchErrorKind::Status(503));
        assert_eq!(error.to_string(), "read page 2 of 'sales.csv': service unavailable");
    }

    #[test]
    fn fetch_error_converts() {
        let error: InspectorError = FetchError::timeout("elapsed").into();
        assert!(error.is_fetch_error());
        assert!(!InspectorError::NoActiveDataset.is_fetch_error());
    }
}
