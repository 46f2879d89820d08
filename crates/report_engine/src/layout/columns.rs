use contracts::shared::report::{ColumnDescriptor, ColumnType};
use serde::Serialize;

use super::geometry::PageGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
}

/// A column as placed on the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnLayout {
    pub key: String,
    pub label: String,
    pub column_type: ColumnType,
    /// Millimetres
    pub width: f64,
    pub align: Align,
}

/// Lay out columns across the content width.
///
/// Explicit widths are kept; the remaining width is split evenly between
/// the other columns, never below `min_column_width`.
pub fn layout_columns(columns: &[ColumnDescriptor], geometry: &PageGeometry) -> Vec<ColumnLayout> {
    let explicit = |c: &ColumnDescriptor| c.width.filter(|w| w.is_finite() && *w > 0.0);

    let fixed: f64 = columns.iter().filter_map(explicit).sum();
    let flexible = columns.iter().filter(|c| explicit(c).is_none()).count();
    let remaining = (geometry.content_width() - fixed).max(0.0);
    let share = if flexible > 0 {
        (remaining / flexible as f64).max(geometry.min_column_width)
    } else {
        0.0
    };

    let laid_out: Vec<ColumnLayout> = columns
        .iter()
        .map(|c| ColumnLayout {
            key: c.key.clone(),
            label: c.label.clone(),
            column_type: c.column_type,
            width: explicit(c).unwrap_or(share),
            align: if c.column_type.is_numeric() {
                Align::Right
            } else {
                Align::Left
            },
        })
        .collect();

    let total: f64 = laid_out.iter().map(|c| c.width).sum();
    if total > geometry.content_width() + f64::EPSILON {
        tracing::warn!(
            "Columns need {:.1}mm but the page offers {:.1}mm",
            total,
            geometry.content_width()
        );
    }
    laid_out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths(columns: &[ColumnLayout]) -> Vec<f64> {
        columns.iter().map(|c| c.width).collect()
    }

    #[test]
    fn test_flexible_columns_share_remaining_width() {
        let geometry = PageGeometry::a4(); // 182mm content
        let columns = vec![
            ColumnDescriptor::text("no", "No.").with_width(22.0),
            ColumnDescriptor::text("name", "Name"),
            ColumnDescriptor::currency("income", "Income"),
        ];
        let laid_out = layout_columns(&columns, &geometry);
        assert_eq!(widths(&laid_out), vec![22.0, 80.0, 80.0]);
        assert_eq!(laid_out[2].align, Align::Right);
        assert_eq!(laid_out[1].align, Align::Left);
    }

    #[test]
    fn test_minimum_width_when_page_is_crowded() {
        let geometry = PageGeometry::a4();
        let columns = vec![
            ColumnDescriptor::text("wide", "Wide").with_width(180.0),
            ColumnDescriptor::text("a", "A"),
            ColumnDescriptor::text("b", "B"),
        ];
        let laid_out = layout_columns(&columns, &geometry);
        assert_eq!(widths(&laid_out), vec![180.0, 15.0, 15.0]);
    }

    #[test]
    fn test_non_positive_explicit_width_is_flexible() {
        let geometry = PageGeometry::a4();
        let columns = vec![
            ColumnDescriptor::text("a", "A").with_width(0.0),
            ColumnDescriptor::text("b", "B"),
        ];
        assert_eq!(widths(&layout_columns(&columns, &geometry)), vec![91.0, 91.0]);
    }
}
