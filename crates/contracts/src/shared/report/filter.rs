use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of input control behind a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    Text,
    Select,
    Date,
    Tel,
}

/// One entry of a select filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declaration of one user-editable constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: FilterKind,
    /// Only present for `select`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
}

impl FilterDescriptor {
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: FilterKind::Text,
            options: None,
        }
    }

    pub fn tel(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Tel,
            ..Self::text(key, label)
        }
    }

    pub fn date(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Date,
            ..Self::text(key, label)
        }
    }

    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: FilterKind::Select,
            options: Some(options),
        }
    }

    /// Whether `value` may be assigned to this filter. Empty always clears.
    pub fn accepts(&self, value: &str) -> bool {
        if value.is_empty() {
            return true;
        }
        match (self.kind, &self.options) {
            (FilterKind::Select, Some(options)) => options.iter().any(|o| o.value == value),
            (FilterKind::Select, None) => false,
            (FilterKind::Date, _) => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            _ => true,
        }
    }
}

/// Current filter values of a report.
///
/// An unset key means "no constraint". Absent dates mean "all time";
/// no default range is ever injected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl FilterState {
    /// Merge a single value; an empty value removes the key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Replace the date range; empty strings are stored as unbounded
    pub fn set_date_range(&mut self, from: Option<String>, to: Option<String>) {
        self.date_from = from.filter(|s| !s.is_empty());
        self.date_to = to.filter(|s| !s.is_empty());
    }

    pub fn date_bounds(&self) -> (Option<chrono::NaiveDate>, Option<chrono::NaiveDate>) {
        let parse = |s: &Option<String>| {
            s.as_deref()
                .and_then(|v| chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        };
        (parse(&self.date_from), parse(&self.date_to))
    }

    /// Number of active constraints, the date range counts as one
    pub fn active_count(&self) -> usize {
        let dates = usize::from(self.date_from.is_some() || self.date_to.is_some());
        self.values.len() + dates
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.date_from = None;
        self.date_to = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_unsets_key() {
        let mut state = FilterState::default();
        state.set("purok", "Go");
        assert_eq!(state.get("purok"), Some("Go"));
        state.set("purok", "");
        assert_eq!(state.get("purok"), None);
        assert!(state.is_empty());
    }

    #[test]
    fn test_no_default_date_range() {
        let state = FilterState::default();
        assert_eq!(state.date_bounds(), (None, None));

        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("dateFrom").is_none());
    }

    #[test]
    fn test_date_range_counts_once() {
        let mut state = FilterState::default();
        state.set("bloodType", "O+");
        state.set_date_range(Some("2024-01-01".into()), Some("2024-12-31".into()));
        assert_eq!(state.active_count(), 2);

        state.set_date_range(Some(String::new()), None);
        assert_eq!(state.active_count(), 1);
    }

    #[test]
    fn test_select_accepts_declared_options_only() {
        let filter = FilterDescriptor::select(
            "bloodType",
            "Blood Type",
            vec![SelectOption::new("O+", "O+"), SelectOption::new("A+", "A+")],
        );
        assert!(filter.accepts("O+"));
        assert!(filter.accepts(""));
        assert!(!filter.accepts("Z"));
    }

    #[test]
    fn test_date_filter_requires_iso_date() {
        let filter = FilterDescriptor::date("referredOn", "Referred On");
        assert!(filter.accepts("2024-03-15"));
        assert!(!filter.accepts("15.03.2024"));
    }
}
