use async_trait::async_trait;
use contracts::shared::report::{
    FilterKind, FilterState, Record, ReportDefinition, ReportMode, ReportPayload,
};
use std::collections::HashMap;
use std::path::Path;

use crate::error::FetchError;
use crate::format::parse_date;

/// The one outward call of the engine: resolve a filter set to rows.
///
/// Preview may return a source-limited set plus `total`; Generate must
/// return the complete matching set.
#[async_trait]
pub trait ReportDataSource: Send + Sync {
    async fn fetch(
        &self,
        filters: &FilterState,
        mode: ReportMode,
    ) -> Result<ReportPayload, FetchError>;
}

/// Data source over records held in memory.
///
/// Text and tel filters match case-insensitively by substring, select
/// filters match exactly. Rows keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    records: Vec<Record>,
    kinds: HashMap<String, FilterKind>,
    date_key: Option<String>,
    preview_limit: Option<usize>,
}

impl InMemoryDataSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Take filter kinds from the report declaration
    pub fn for_report(records: Vec<Record>, definition: &ReportDefinition) -> Self {
        let kinds = definition
            .filters
            .iter()
            .map(|f| (f.key.clone(), f.kind))
            .collect();
        Self {
            records,
            kinds,
            ..Self::default()
        }
    }

    /// Column that dateFrom/dateTo bound (inclusive)
    pub fn with_date_key(mut self, key: impl Into<String>) -> Self {
        self.date_key = Some(key.into());
        self
    }

    /// Truncate preview answers; `total` keeps the full match count
    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = Some(limit);
        self
    }

    /// Load records from a JSON file holding an array of objects
    pub fn from_json_file(path: &Path, definition: &ReportDefinition) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let records: Vec<Record> = serde_json::from_str(&contents)?;
        tracing::info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self::for_report(records, definition))
    }

    fn matches(&self, record: &Record, filters: &FilterState) -> bool {
        let values_match = filters.values.iter().all(|(key, wanted)| {
            let Some(value) = record.get(key) else {
                return false;
            };
            let actual = value.to_string();
            match self.kinds.get(key).copied().unwrap_or_default() {
                FilterKind::Select => actual == *wanted,
                FilterKind::Date => parse_date(value)
                    .map(|d| d.format("%Y-%m-%d").to_string() == *wanted)
                    .unwrap_or(false),
                FilterKind::Text | FilterKind::Tel => {
                    actual.to_lowercase().contains(&wanted.to_lowercase())
                }
            }
        });
        values_match && self.in_date_range(record, filters)
    }

    fn in_date_range(&self, record: &Record, filters: &FilterState) -> bool {
        let (from, to) = filters.date_bounds();
        if from.is_none() && to.is_none() {
            return true;
        }
        let Some(key) = &self.date_key else {
            return true;
        };
        let Some(date) = record.get(key).and_then(parse_date) else {
            return false;
        };
        from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
    }
}

#[async_trait]
impl ReportDataSource for InMemoryDataSource {
    async fn fetch(
        &self,
        filters: &FilterState,
        mode: ReportMode,
    ) -> Result<ReportPayload, FetchError> {
        let matched: Vec<Record> = self
            .records
            .iter()
            .filter(|r| self.matches(r, filters))
            .cloned()
            .collect();
        let total = matched.len();

        let data = match (mode, self.preview_limit) {
            (ReportMode::Preview, Some(limit)) => matched.into_iter().take(limit).collect(),
            _ => matched,
        };
        tracing::debug!("{:?} fetch matched {} of {} records", mode, total, self.records.len());
        Ok(ReportPayload::new(data, total))
    }
}
