//! Document emission: serialize a laid-out [`Document`] into a file.

pub mod csv;
pub mod html;

pub use self::csv::CsvEmitter;
pub use self::html::HtmlEmitter;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DocumentSettings;
use crate::error::EmissionError;
use crate::layout::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Html,
    Csv,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Html => "html",
            DocumentFormat::Csv => "csv",
        }
    }
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedDocument {
    pub path: PathBuf,
    pub pages: usize,
    pub rows: usize,
}

/// Performs the actual file write of a laid-out document.
///
/// Failures are reported to the session, which stays usable.
#[async_trait]
pub trait DocumentEmitter: Send + Sync {
    fn format(&self) -> DocumentFormat;

    async fn emit(
        &self,
        document: &Document,
        filename: &str,
    ) -> Result<EmittedDocument, EmissionError>;
}

/// `<Report_Title>_<YYYY-MM-DD>.<ext>`; whitespace runs become one underscore
pub fn suggested_filename(title: &str, date: NaiveDate, format: DocumentFormat) -> String {
    let stem = title
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    format!("{}_{}.{}", stem, date.format("%Y-%m-%d"), format.extension())
}

/// Emitter configured by the `[document]` section
pub fn emitter_for(settings: &DocumentSettings) -> Arc<dyn DocumentEmitter> {
    let dir = PathBuf::from(&settings.output_dir);
    match settings.format {
        DocumentFormat::Html => Arc::new(HtmlEmitter::new(dir)),
        DocumentFormat::Csv => Arc::new(CsvEmitter::new(dir)),
    }
}

/// Write bytes under `dir`, creating it on demand
async fn write_file(dir: &Path, filename: &str, bytes: Vec<u8>) -> Result<PathBuf, EmissionError> {
    let dir = dir.to_path_buf();
    let path = dir.join(filename);
    let target = path.clone();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        std::fs::create_dir_all(&dir)?;
        std::fs::write(&target, bytes)
    })
    .await
    .map_err(|e| EmissionError::Rejected(format!("write task failed: {}", e)))??;
    Ok(path)
}
