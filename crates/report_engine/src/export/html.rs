use async_trait::async_trait;
use std::fmt::Write as _;
use std::path::PathBuf;

use super::{write_file, DocumentEmitter, DocumentFormat, EmittedDocument};
use crate::error::EmissionError;
use crate::layout::{Align, Band, Document, Page};

/// Printable HTML: one `<section class="page">` per laid-out page
#[derive(Debug, Clone)]
pub struct HtmlEmitter {
    output_dir: PathBuf,
}

const STYLE: &str = r#"
body { font-family: Arial, Helvetica, sans-serif; font-size: 9pt; margin: 0; }
.page { box-sizing: border-box; page-break-after: always; position: relative; }
.page:last-child { page-break-after: auto; }
.page-header { text-align: center; line-height: 1.4; }
.page-header .bold { font-weight: bold; font-size: 11pt; }
table { border-collapse: collapse; table-layout: fixed; margin-top: 4mm; }
th { background: #2f5597; color: #fff; text-align: left; padding: 1mm; }
td { padding: 1mm; border-bottom: 1px solid #ddd; overflow: hidden; }
tr.even td { background: #ffffff; }
tr.odd td { background: #f2f2f2; }
td.right, th.right { text-align: right; }
.page-footer { position: absolute; bottom: 0; left: 0; right: 0; text-align: center; font-size: 8pt; }
"#;

impl HtmlEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn render(document: &Document) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
             <style>@page {{ size: {}mm {}mm; }}{}</style>\n</head>\n<body>\n",
            escape(&document.title),
            document.geometry_width,
            document.geometry_height,
            STYLE
        );
        for page in &document.pages {
            render_page(&mut html, document, page);
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

fn render_page(html: &mut String, document: &Document, page: &Page) {
    let _ = writeln!(
        html,
        "<section class=\"page\" style=\"width: {}mm; height: {}mm;\">",
        document.geometry_width, document.geometry_height
    );

    html.push_str("<div class=\"page-header\">\n");
    for line in page.header.lines() {
        let class = if line.bold { " class=\"bold\"" } else { "" };
        let _ = writeln!(html, "<div{}>{}</div>", class, escape(&line.text));
    }
    html.push_str("</div>\n<table>\n<thead><tr>");
    for column in &document.columns {
        let _ = write!(
            html,
            "<th style=\"width: {:.1}mm\"{}>{}</th>",
            column.width,
            align_class(column.align),
            escape(&column.label)
        );
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in &page.rows {
        let band = match row.band {
            Band::Even => "even",
            Band::Odd => "odd",
        };
        let _ = write!(html, "<tr class=\"{}\">", band);
        for (cell, column) in row.cells.iter().zip(&document.columns) {
            let _ = write!(html, "<td{}>{}</td>", align_class(column.align), escape(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");

    let _ = writeln!(
        html,
        "<div class=\"page-footer\"><div>{}</div><div>{}</div></div>\n</section>",
        escape(&page.footer.label()),
        escape(&page.footer.disclaimer)
    );
}

fn align_class(align: Align) -> &'static str {
    match align {
        Align::Left => "",
        Align::Right => " class=\"right\"",
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[async_trait]
impl DocumentEmitter for HtmlEmitter {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Html
    }

    async fn emit(
        &self,
        document: &Document,
        filename: &str,
    ) -> Result<EmittedDocument, EmissionError> {
        let html = Self::render(document);
        let path = write_file(&self.output_dir, filename, html.into_bytes()).await?;
        tracing::info!("HTML report written: {}", path.display());
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
    fn test_render_pages_headers_and_bands() {
        let document = sample_document(3);
        let html = HtmlEmitter::render(&document);

        assert_eq!(html.matches("<section class=\"page\"").count(), 2);
        assert_eq!(html.matches("Republic of the Philippines").count(), 2);
        assert!(html.contains("<div class=\"bold\">BARANGAY HEALTH AND RECORDS OFFICE</div>"));
        assert!(html.contains("Page 1 of 2"));
        assert!(html.contains("Page 2 of 2"));
        assert_eq!(html.matches("<tr class=\"even\">").count(), 2);
        assert_eq!(html.matches("<tr class=\"odd\">").count(), 1);
        assert!(html.contains("Resident; &quot;0&quot;"));
        assert!(html.contains("<td class=\"right\">₱1,000.00</td>"));
    }

    #[tokio::test]
    async fn test_emit_creates_output_dir() {
        let dir = temp_dir().join("nested");
        let document = sample_document(1);
        let emitted = HtmlEmitter::new(&dir)
            .emit(&document, "Household_Roster_2024-03-15.html")
            .await
            .unwrap();
        assert_eq!(emitted.pages, 1);
        let written = std::fs::read_to_string(&emitted.path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_emit_into_file_path_fails() {
        let blocker = temp_dir();
        std::fs::write(&blocker, b"not a directory").unwrap();
        let result = HtmlEmitter::new(&blocker)
            .emit(&sample_document(1), "report.html")
            .await;
        assert!(matches!(result, Err(EmissionError::Io(_))));
        let _ = std::fs::remove_file(blocker);
    }
}
