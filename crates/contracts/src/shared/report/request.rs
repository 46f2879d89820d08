use serde::{Deserialize, Serialize};
use std::fmt;

use super::filter::FilterState;
use super::record::Record;

/// Monotonically increasing request token used to drop stale responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    pub fn next(self) -> Self {
        Fingerprint(self.0 + 1)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the fetched rows are for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Non-committal on-screen preview; the source may truncate
    Preview,
    /// Document generation; the source must return the complete set
    Generate,
}

/// Immutable snapshot sent to the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub filters: FilterState,
    pub mode: ReportMode,
    pub fingerprint: Fingerprint,
}

/// Rows returned by the data source plus the server-side match count.
///
/// `total` may exceed `data.len()` when the source truncates a preview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub data: Vec<Record>,
    pub total: usize,
}

impl ReportPayload {
    pub fn new(data: Vec<Record>, total: usize) -> Self {
        Self { data, total }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Answer to a [`ReportRequest`], tagged with the fingerprint it answers
#[derive(Debug, Clone)]
pub struct ReportResult<E = String> {
    pub fingerprint: Fingerprint,
    pub mode: ReportMode,
    pub outcome: Result<ReportPayload, E>,
}

impl<E> ReportResult<E> {
    pub fn answering(request: &ReportRequest, outcome: Result<ReportPayload, E>) -> Self {
        Self {
            fingerprint: request.fingerprint,
            mode: request.mode,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_monotonic() {
        let first = Fingerprint::default().next();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.to_string(), "#2");
    }

    #[test]
    fn test_request_serializes_filters_camel_case() {
        let mut filters = FilterState::default();
        filters.set("purok", "Go");
        filters.set_date_range(Some("2024-01-01".into()), None);
        let request = ReportRequest {
            filters,
            mode: ReportMode::Preview,
            fingerprint: Fingerprint(7),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["fingerprint"], 7);
        assert_eq!(json["mode"], "preview");
        assert_eq!(json["filters"]["dateFrom"], "2024-01-01");
        assert_eq!(json["filters"]["values"]["purok"], "Go");
    }
}
