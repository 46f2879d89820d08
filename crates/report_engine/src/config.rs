use serde::Deserialize;
use std::path::Path;

use crate::export::DocumentFormat;
use crate::layout::PageGeometry;

/// Deployment currency. Every currency cell is rendered with it.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₱";
pub const DEFAULT_CURRENCY_CODE: &str = "PHP";
pub const DEFAULT_CURRENCY_DECIMALS: u8 = 2;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub session: SessionSettings,
    pub locale: LocaleSettings,
    pub currency: CurrencyFormat,
    pub document: DocumentSettings,
    pub page: PageGeometry,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    /// Trailing-edge debounce for filter edits
    pub debounce_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl SessionSettings {
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

/// Host locale conventions used by the column formatter
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LocaleSettings {
    /// chrono format of the short date form
    pub date_format: String,
    pub datetime_format: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
    /// Plain numbers keep up to this many fraction digits
    pub max_fraction_digits: u8,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            date_format: "%m/%d/%Y".to_string(),
            datetime_format: "%m/%d/%Y %I:%M %p".to_string(),
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            max_fraction_digits: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub code: String,
    pub decimals: u8,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            code: DEFAULT_CURRENCY_CODE.to_string(),
            decimals: DEFAULT_CURRENCY_DECIMALS,
        }
    }
}

/// Fixed texts of the printed document and where it is written
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DocumentSettings {
    /// Three identification lines at the top of every page
    pub jurisdiction: Vec<String>,
    /// Bold title line under the jurisdiction block
    pub office_title: String,
    pub disclaimer: String,
    pub output_dir: String,
    pub format: DocumentFormat,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            jurisdiction: vec![
                "Republic of the Philippines".to_string(),
                "Province of Laguna".to_string(),
                "Municipality of Bay".to_string(),
            ],
            office_title: "BARANGAY HEALTH AND RECORDS OFFICE".to_string(),
            disclaimer: "This is a system-generated document. No signature is required."
                .to_string(),
            output_dir: "target/reports".to_string(),
            format: DocumentFormat::Html,
        }
    }
}

/// Default configuration embedded in the binary
pub const DEFAULT_CONFIG: &str = r#"
[session]
debounce_ms = 300

[locale]
date_format = "%m/%d/%Y"
datetime_format = "%m/%d/%Y %I:%M %p"
thousands_separator = ","
decimal_separator = "."
max_fraction_digits = 3

[currency]
symbol = "₱"
code = "PHP"
decimals = 2

[document]
jurisdiction = ["Republic of the Philippines", "Province of Laguna", "Municipality of Bay"]
office_title = "BARANGAY HEALTH AND RECORDS OFFICE"
disclaimer = "This is a system-generated document. No signature is required."
output_dir = "target/reports"
format = "html"

[page]
width = 210.0
height = 297.0
margin = 14.0
header_height = 48.0
table_header_height = 8.0
footer_height = 12.0
row_height = 7.0
min_column_width = 15.0
"#;

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        if config.document.jurisdiction.len() != 3 {
            tracing::warn!(
                "Expected 3 jurisdiction lines, got {}",
                config.document.jurisdiction.len()
            );
        }
        Ok(config)
    }
}

/// Load configuration
///
/// Search order:
/// 1. Explicit path (fails if it cannot be read)
/// 2. config.toml next to the executable
/// 3. Falls back to embedded default config
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<EngineConfig> {
    if let Some(path) = explicit {
        tracing::info!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        return EngineConfig::from_toml_str(&contents);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return EngineConfig::from_toml_str(&contents);
            } else {
                tracing::debug!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    EngineConfig::from_toml_str(DEFAULT_CONFIG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = EngineConfig::from_toml_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.session.debounce_ms, 300);
        assert_eq!(config.currency.symbol, "₱");
        assert_eq!(config.document.jurisdiction.len(), 3);
    }

    #[test]
    fn test_embedded_config_matches_defaults() {
        let parsed = EngineConfig::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, EngineConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [session]
            debounce_ms = 150

            [document]
            format = "csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.session.debounce_ms, 150);
        assert_eq!(config.document.format, DocumentFormat::Csv);
        assert_eq!(config.currency, CurrencyFormat::default());
        assert_eq!(config.page.row_height, 7.0);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("missing-{}.toml", uuid::Uuid::new_v4()));
        assert!(load_config(Some(&path)).is_err());
    }
}
