use serde::{Deserialize, Serialize};

/// Semantic type of a report column, drives cell formatting and alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Date,
    Currency,
}

impl ColumnType {
    /// Numeric columns are right-aligned in the printed table
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Number | ColumnType::Currency)
    }
}

/// Column declaration of a report table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Record key (unique within a report)
    pub key: String,
    /// Header label
    pub label: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    /// Explicit width in millimetres; columns without one share the rest of the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            column_type,
            width: None,
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, ColumnType::Text)
    }

    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, ColumnType::Number)
    }

    pub fn date(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, ColumnType::Date)
    }

    pub fn currency(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, ColumnType::Currency)
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }
}
