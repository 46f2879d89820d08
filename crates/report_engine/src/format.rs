//! Cell formatting: raw record value + declared column type → display string.
//!
//! Formatting is total. A value that cannot be coerced to its column type
//! falls back to its generic string form, so one bad cell never aborts a
//! preview or a document.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use contracts::shared::report::{CellValue, ColumnDescriptor, ColumnType, Record};
use once_cell::sync::Lazy;

use crate::config::{CurrencyFormat, EngineConfig, LocaleSettings};
use crate::error::FormatError;

/// Rendered for null/missing values regardless of column type
pub const NOT_AVAILABLE: &str = "N/A";

static DEFAULT_FORMATTER: Lazy<ColumnFormatter> = Lazy::new(ColumnFormatter::default);

/// Format with the default locale and deployment currency
pub fn format_cell(value: &CellValue, column_type: ColumnType) -> String {
    DEFAULT_FORMATTER.format(value, column_type)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnFormatter {
    locale: LocaleSettings,
    currency: CurrencyFormat,
}

impl ColumnFormatter {
    pub fn new(locale: LocaleSettings, currency: CurrencyFormat) -> Self {
        Self { locale, currency }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.locale.clone(), config.currency.clone())
    }

    pub fn locale(&self) -> &LocaleSettings {
        &self.locale
    }

    /// Never fails: uncoercible values degrade to their raw string
    pub fn format(&self, value: &CellValue, column_type: ColumnType) -> String {
        match self.try_format(value, column_type) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("Cell fallback to raw value: {}", e);
                value.to_string()
            }
        }
    }

    pub fn try_format(
        &self,
        value: &CellValue,
        column_type: ColumnType,
    ) -> Result<String, FormatError> {
        if value.is_null() {
            return Ok(NOT_AVAILABLE.to_string());
        }
        match column_type {
            ColumnType::Text => Ok(value.to_string()),
            ColumnType::Date => parse_date(value)
                .map(|date| date.format(&self.locale.date_format).to_string())
                .ok_or_else(|| FormatError::UnparseableDate(value.to_string())),
            ColumnType::Number => {
                let n = coerce_number(value)?;
                Ok(self.format_number(n))
            }
            ColumnType::Currency => {
                let n = coerce_number(value)?;
                Ok(self.format_currency(n))
            }
        }
    }

    /// Cells of one record in column order; missing keys count as null
    pub fn format_record(&self, record: &Record, columns: &[ColumnDescriptor]) -> Vec<String> {
        columns
            .iter()
            .map(|column| match record.get(&column.key) {
                Some(value) => self.format(value, column.column_type),
                None => NOT_AVAILABLE.to_string(),
            })
            .collect()
    }

    /// Grouped digits, up to `max_fraction_digits` decimals with trailing zeros trimmed
    pub fn format_number(&self, n: f64) -> String {
        let digits = usize::from(self.locale.max_fraction_digits);
        let fixed = format!("{:.*}", digits, n.abs());
        let (int_part, frac_part) = split_fixed(&fixed);
        let frac_part = frac_part.trim_end_matches('0');

        let mut result = self.group(int_part);
        if !frac_part.is_empty() {
            result.push_str(&self.locale.decimal_separator);
            result.push_str(frac_part);
        }
        with_sign(n, &fixed, result)
    }

    /// Symbol + grouped integer part + fixed decimals, e.g. "₱1,234.50"
    pub fn format_currency(&self, n: f64) -> String {
        let digits = usize::from(self.currency.decimals);
        let fixed = format!("{:.*}", digits, n.abs());
        let (int_part, frac_part) = split_fixed(&fixed);

        let mut result = self.currency.symbol.clone();
        result.push_str(&self.group(int_part));
        if !frac_part.is_empty() {
            result.push_str(&self.locale.decimal_separator);
            result.push_str(frac_part);
        }
        with_sign(n, &fixed, result)
    }

    /// Inserts the thousands separator every 3 digits from the right
    fn group(&self, int_part: &str) -> String {
        let mut result = String::new();
        for (i, ch) in int_part.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                result.push_str(&self.locale.thousands_separator.chars().rev().collect::<String>());
            }
            result.push(ch);
        }
        result.chars().rev().collect()
    }
}

fn split_fixed(fixed: &str) -> (&str, &str) {
    fixed.split_once('.').unwrap_or((fixed, ""))
}

/// Negative sign only when the rounded magnitude is not zero
fn with_sign(n: f64, fixed: &str, formatted: String) -> String {
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if n.is_sign_negative() && !is_zero {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

fn coerce_number(value: &CellValue) -> Result<f64, FormatError> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormatError::NotANumber(value.to_string()))
}

/// Accepts ISO dates, ISO/RFC 3339 datetimes and epoch milliseconds
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Text(s) => parse_date_str(s.trim()),
        CellValue::Number(ms) if ms.is_finite() => {
            DateTime::from_timestamp_millis(*ms as i64).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}
