//! Paginated document layout.
//!
//! Turns records + column declarations + page geometry into pages with a
//! repeating header block, banded table rows and a numbered footer. No I/O:
//! the emitters in [`crate::export`] serialize the result.

pub mod columns;
pub mod geometry;

pub use columns::{layout_columns, Align, ColumnLayout};
pub use geometry::PageGeometry;

use chrono::NaiveDateTime;
use contracts::shared::report::{ColumnDescriptor, Orientation, Record};
use serde::Serialize;

use crate::config::{DocumentSettings, EngineConfig};
use crate::format::ColumnFormatter;

/// Block repeated verbatim at the top of every page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderBlock {
    pub jurisdiction: Vec<String>,
    /// Printed bold
    pub office_title: String,
    pub report_title: String,
    pub generated_on: String,
    pub total_records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderLine {
    pub text: String,
    pub bold: bool,
}

impl HeaderBlock {
    /// Lines in print order
    pub fn lines(&self) -> Vec<HeaderLine> {
        let plain = |text: String| HeaderLine { text, bold: false };
        let mut lines: Vec<HeaderLine> = self.jurisdiction.iter().cloned().map(plain).collect();
        lines.push(HeaderLine {
            text: self.office_title.clone(),
            bold: true,
        });
        lines.push(plain(self.report_title.clone()));
        lines.push(plain(format!("Generated on: {}", self.generated_on)));
        lines.push(plain(format!("Total Records: {}", self.total_records)));
        lines
    }
}

/// Visual band of a row, taken from its position in the full result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Even,
    Odd,
}

impl Band {
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Band::Even
        } else {
            Band::Odd
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutRow {
    /// Zero-based position in the full record sequence
    pub index: usize,
    pub band: Band,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footer {
    pub page_number: usize,
    pub page_count: usize,
    pub disclaimer: String,
}

impl Footer {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page_number, self.page_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub header: HeaderBlock,
    pub rows: Vec<LaidOutRow>,
    pub footer: Footer,
}

/// Finished, ready-to-emit document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub title: String,
    pub orientation: Orientation,
    pub geometry_width: f64,
    pub geometry_height: f64,
    pub columns: Vec<ColumnLayout>,
    pub generated_at: NaiveDateTime,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn row_count(&self) -> usize {
        self.pages.iter().map(|p| p.rows.len()).sum()
    }

    pub fn rows(&self) -> impl Iterator<Item = &LaidOutRow> {
        self.pages.iter().flat_map(|p| p.rows.iter())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentLayoutEngine {
    settings: DocumentSettings,
    formatter: ColumnFormatter,
}

impl DocumentLayoutEngine {
    pub fn new(settings: DocumentSettings, formatter: ColumnFormatter) -> Self {
        Self {
            settings,
            formatter,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.document.clone(), ColumnFormatter::from_config(config))
    }

    /// Paginate `records` in their original order.
    ///
    /// An empty record set still yields one page carrying the header and
    /// footer, so the document is never blank.
    pub fn layout(
        &self,
        title: &str,
        records: &[Record],
        columns: &[ColumnDescriptor],
        geometry: &PageGeometry,
        generated_at: NaiveDateTime,
    ) -> Document {
        let capacity = geometry.rows_per_page();
        let page_count = records.len().div_ceil(capacity).max(1);

        let header = HeaderBlock {
            jurisdiction: self.settings.jurisdiction.clone(),
            office_title: self.settings.office_title.clone(),
            report_title: title.to_string(),
            generated_on: generated_at
                .format(&self.formatter.locale().datetime_format)
                .to_string(),
            total_records: records.len(),
        };

        let mut pages: Vec<Page> = Vec::with_capacity(page_count);
        for page_index in 0..page_count {
            let start = page_index * capacity;
            let end = (start + capacity).min(records.len());
            let rows = records[start..end]
                .iter()
                .enumerate()
                .map(|(offset, record)| {
                    let index = start + offset;
                    LaidOutRow {
                        index,
                        band: Band::for_index(index),
                        cells: self.formatter.format_record(record, columns),
                    }
                })
                .collect();

            pages.push(Page {
                header: header.clone(),
                rows,
                footer: Footer {
                    page_number: page_index + 1,
                    page_count,
                    disclaimer: self.settings.disclaimer.clone(),
                },
            });
        }

        tracing::debug!(
            "Laid out {} records on {} pages ({} rows per page)",
            records.len(),
            page_count,
            capacity
        );

        Document {
            title: title.to_string(),
            orientation: geometry.orientation,
            geometry_width: geometry.width,
            geometry_height: geometry.height,
            columns: layout_columns(columns, geometry),
            generated_at,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::shared::report::CellValue;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::number("no", "No."),
            ColumnDescriptor::text("name", "Name"),
            ColumnDescriptor::date("checkup", "Checkup"),
        ]
    }

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let mut r = Record::new();
                r.insert("no".into(), CellValue::Number(i as f64));
                r.insert("name".into(), format!("Resident {}", i).into());
                r.insert("checkup".into(), "2024-01-31".into());
                r
            })
            .collect()
    }

    /// Geometry holding exactly `rows` body rows
    fn geometry_for(rows: usize) -> PageGeometry {
        let base = PageGeometry::a4();
        let fixed = 2.0 * base.margin + base.header_height + base.table_header_height + base.footer_height;
        PageGeometry {
            height: fixed + rows as f64 * base.row_height + base.row_height / 2.0,
            ..base
        }
    }

    #[test]
    fn test_pagination_is_complete_and_ordered() {
        let engine = DocumentLayoutEngine::default();
        for (n, capacity) in [(1, 5), (5, 5), (6, 5), (23, 4), (100, 28)] {
            let geometry = geometry_for(capacity);
            assert_eq!(geometry.rows_per_page(), capacity);

            let doc = engine.layout("Test", &records(n), &columns(), &geometry, generated_at());
            assert_eq!(doc.page_count(), n.div_ceil(capacity), "n={} r={}", n, capacity);

            let indices: Vec<usize> = doc.rows().map(|r| r.index).collect();
            assert_eq!(indices, (0..n).collect::<Vec<_>>());

            let names: Vec<&str> = doc.rows().map(|r| r.cells[1].as_str()).collect();
            let expected: Vec<String> = (0..n).map(|i| format!("Resident {}", i)).collect();
            assert_eq!(names, expected);
        }
    }

    #[test]
    fn test_banding_independent_of_page_capacity() {
        let engine = DocumentLayoutEngine::default();
        let data = records(17);
        let small = engine.layout("T", &data, &columns(), &geometry_for(3), generated_at());
        let large = engine.layout("T", &data, &columns(), &geometry_for(7), generated_at());

        let bands = |doc: &Document| doc.rows().map(|r| r.band).collect::<Vec<_>>();
        assert_eq!(bands(&small), bands(&large));

        // page 2 of the 3-row layout starts at an odd global index
        assert_eq!(small.pages[1].rows[0].index, 3);
        assert_eq!(small.pages[1].rows[0].band, Band::Odd);
    }

    #[test]
    fn test_header_identical_on_every_page_and_footer_numbered() {
        let engine = DocumentLayoutEngine::default();
        let doc = engine.layout("Household Roster", &records(10), &columns(), &geometry_for(4), generated_at());
        assert_eq!(doc.page_count(), 3);

        let first = &doc.pages[0].header;
        assert!(doc.pages.iter().all(|p| &p.header == first));
        assert_eq!(first.total_records, 10);
        assert_eq!(first.generated_on, "03/15/2024 02:30 PM");

        let lines = first.lines();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0].text, "Republic of the Philippines");
        assert!(lines[3].bold);
        assert_eq!(lines[4].text, "Household Roster");
        assert_eq!(lines[6].text, "Total Records: 10");

        let labels: Vec<String> = doc.pages.iter().map(|p| p.footer.label()).collect();
        assert_eq!(labels, vec!["Page 1 of 3", "Page 2 of 3", "Page 3 of 3"]);
        assert!(doc.pages[2].footer.disclaimer.contains("system-generated"));
    }

    #[test]
    fn test_bad_date_cell_does_not_abort_layout() {
        let engine = DocumentLayoutEngine::default();
        let mut data = records(3);
        data[1].insert("checkup".into(), "not a date".into());
        data[2].remove("name");

        let doc = engine.layout("T", &data, &columns(), &geometry_for(10), generated_at());
        assert_eq!(doc.row_count(), 3);
        assert_eq!(doc.pages[0].rows[0].cells[2], "01/31/2024");
        assert_eq!(doc.pages[0].rows[1].cells[2], "not a date");
        assert_eq!(doc.pages[0].rows[2].cells[1], "N/A");
    }

    #[test]
    fn test_empty_result_yields_single_page() {
        let engine = DocumentLayoutEngine::default();
        let doc = engine.layout("T", &[], &columns(), &PageGeometry::a4(), generated_at());
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.row_count(), 0);
        assert_eq!(doc.pages[0].footer.label(), "Page 1 of 1");
    }
}
