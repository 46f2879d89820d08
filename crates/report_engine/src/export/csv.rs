use async_trait::async_trait;
use std::path::PathBuf;

use super::{write_file, DocumentEmitter, DocumentFormat, EmittedDocument};
use crate::error::EmissionError;
use crate::layout::Document;

/// Flat CSV export: column labels followed by every formatted row.
/// Pagination is dropped, rows keep document order.
#[derive(Debug, Clone)]
pub struct CsvEmitter {
    output_dir: PathBuf,
}

impl CsvEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn render(document: &Document) -> Result<Vec<u8>, EmissionError> {
        // UTF-8 BOM so spreadsheet apps detect the encoding (₱ sign, ñ)
        let buffer = "\u{FEFF}".as_bytes().to_vec();
        let mut writer = ::csv::WriterBuilder::new().from_writer(buffer);

        writer.write_record(document.columns.iter().map(|c| c.label.as_str()))?;
        for row in document.rows() {
            writer.write_record(&row.cells)?;
        }
        writer.into_inner().map_err(|e| EmissionError::Io(e.into_error()))
    }
}

#[async_trait]
impl DocumentEmitter for CsvEmitter {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Csv
    }

    async fn emit(
        &self,
        document: &Document,
        filename: &str,
    ) -> Result<EmittedDocument, EmissionError> {
        let bytes = Self::render(document)?;
        let path = write_file(&self.output_dir, filename, bytes).await?;
        tracing::info!("CSV report written: {}", path.display());
        Ok(EmittedDocument {
            path,
            pages: document.page_count(),
            rows: document.row_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::{sample_document, temp_dir};

    #[test]
    fn test_render_escapes_and_keeps_order() {
        let document = sample_document(3);
        let bytes = CsvEmitter::render(&document).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("\u{FEFF}Name,Monthly Income"));
        assert_eq!(lines.next(), Some("\"Resident; \"\"0\"\"\",\"₱1,000.00\""));
        assert_eq!(lines.next(), Some("\"Resident; \"\"1\"\"\",\"₱2,000.00\""));
        assert_eq!(lines.next(), Some("\"Resident; \"\"2\"\"\",\"₱3,000.00\""));
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn test_emit_writes_file() {
        let dir = temp_dir();
        let document = sample_document(5);
        let emitted = CsvEmitter::new(&dir)
            .emit(&document, "Household_Roster_2024-03-15.csv")
            .await
            .unwrap();

        assert_eq!(emitted.path, dir.join("Household_Roster_2024-03-15.csv"));
        assert_eq!(emitted.rows, 5);
        assert_eq!(emitted.pages, 3);
        assert!(emitted.path.exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
