pub mod column;
pub mod definition;
pub mod filter;
pub mod record;
pub mod request;

pub use column::{ColumnDescriptor, ColumnType};
pub use definition::{Orientation, ReportDefinition};
pub use filter::{FilterDescriptor, FilterKind, FilterState, SelectOption};
pub use record::{CellValue, Record};
pub use request::{Fingerprint, ReportMode, ReportPayload, ReportRequest, ReportResult};
