use contracts::shared::report::Orientation;
use serde::Deserialize;

/// Page dimensions and reserved bands, in millimetres.
///
/// `width`/`height` describe the portrait sheet; [`PageGeometry::oriented`]
/// swaps them for landscape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Repeating header block (jurisdiction lines, titles, generated-on, count)
    pub header_height: f64,
    /// Column label row of the table
    pub table_header_height: f64,
    pub footer_height: f64,
    pub row_height: f64,
    /// Flexible columns never shrink below this
    pub min_column_width: f64,
    #[serde(skip)]
    pub orientation: Orientation,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    /// A4 portrait with the standard report bands
    pub fn a4() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 14.0,
            header_height: 48.0,
            table_header_height: 8.0,
            footer_height: 12.0,
            row_height: 7.0,
            min_column_width: 15.0,
            orientation: Orientation::Portrait,
        }
    }

    pub fn oriented(&self, orientation: Orientation) -> Self {
        let (short, long) = if self.width <= self.height {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        };
        let (width, height) = match orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        };
        Self {
            width,
            height,
            orientation,
            ..self.clone()
        }
    }

    pub fn content_width(&self) -> f64 {
        (self.width - 2.0 * self.margin).max(0.0)
    }

    /// Vertical space left for table body rows
    pub fn body_height(&self) -> f64 {
        self.height
            - 2.0 * self.margin
            - self.header_height
            - self.table_header_height
            - self.footer_height
    }

    /// How many rows fit on one page; at least one so layout always progresses
    pub fn rows_per_page(&self) -> usize {
        if self.row_height <= 0.0 {
            return 1;
        }
        let rows = (self.body_height() / self.row_height).floor();
        if rows.is_finite() && rows >= 1.0 {
            rows as usize
        } else {
            1
        }
    }
}
