use serde::{Deserialize, Serialize};

use super::column::ColumnDescriptor;
use super::filter::FilterDescriptor;

/// Page orientation of the printed document, chosen per report type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Everything the engine needs to know about one report type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDefinition {
    /// Stable identifier, e.g. "r101_health_records"
    pub id: String,
    /// Descriptive title printed under the office title and used in the file name
    pub title: String,
    pub columns: Vec<ColumnDescriptor>,
    pub filters: Vec<FilterDescriptor>,
    /// Whether the dateFrom/dateTo pair is offered
    #[serde(default)]
    pub date_range_enabled: bool,
    #[serde(default)]
    pub orientation: Orientation,
}

impl ReportDefinition {
    pub fn filter(&self, key: &str) -> Option<&FilterDescriptor> {
        self.filters.iter().find(|f| f.key == key)
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Returns the first duplicated column key, if any
    pub fn duplicate_column_key(&self) -> Option<&str> {
        self.columns
            .iter()
            .enumerate()
            .find(|(i, c)| self.columns[..*i].iter().any(|prev| prev.key == c.key))
            .map(|(_, c)| c.key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReportDefinition {
        ReportDefinition {
            id: "sample".into(),
            title: "Sample".into(),
            columns: vec![
                ColumnDescriptor::text("name", "Name"),
                ColumnDescriptor::number("age", "Age"),
            ],
            filters: vec![FilterDescriptor::text("purok", "Purok")],
            date_range_enabled: false,
            orientation: Orientation::Portrait,
        }
    }

    #[test]
    fn test_lookup() {
        let def = sample();
        assert!(def.filter("purok").is_some());
        assert!(def.filter("missing").is_none());
        assert_eq!(def.column("age").map(|c| c.label.as_str()), Some("Age"));
    }

    #[test]
    fn test_duplicate_column_key() {
        let mut def = sample();
        assert_eq!(def.duplicate_column_key(), None);
        def.columns.push(ColumnDescriptor::text("name", "Full Name"));
        assert_eq!(def.duplicate_column_key(), Some("name"));
    }
}
