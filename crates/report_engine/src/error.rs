use thiserror::Error;

/// Data source could not answer a request. Never fatal to a session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("data source unreachable: {0}")]
    Unreachable(String),

    #[error("data source rejected the request: {0}")]
    Rejected(String),
}

/// A single cell could not be coerced to its declared column type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormatError {
    #[error("unparseable date: {0}")]
    UnparseableDate(String),

    #[error("not a number: {0}")]
    NotANumber(String),
}

/// Writing the finished document failed
#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("emitter rejected the document: {0}")]
    Rejected(String),
}

/// User intent rejected by the report session
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Generate requested without a non-empty preview; no fetch is issued
    #[error("nothing to generate: the preview is empty")]
    EmptyPreview,

    #[error("a request is already in progress")]
    Busy,

    /// Filters were edited after the preview shown; it must settle first
    #[error("filters changed since the last preview")]
    PreviewOutdated,

    #[error("the report session is closed")]
    Closed,

    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    #[error("invalid value {value:?} for filter {key}")]
    InvalidOption { key: String, value: String },

    #[error("this report has no date range")]
    DateRangeDisabled,

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}
