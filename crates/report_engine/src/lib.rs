//! Report preview and printable document generation.
//!
//! A [`ReportSession`] keeps a debounced live preview in step with filter
//! edits and, on request, fetches the complete result set, lays it out into
//! pages and hands it to a [`DocumentEmitter`].

pub mod config;
pub mod data_source;
pub mod error;
pub mod export;
pub mod filter_session;
pub mod format;
pub mod layout;
pub mod session;

pub use config::{load_config, EngineConfig};
pub use data_source::{InMemoryDataSource, ReportDataSource};
pub use error::{EmissionError, FetchError, FormatError, SessionError};
pub use export::{emitter_for, suggested_filename, DocumentEmitter, DocumentFormat, EmittedDocument};
pub use filter_session::FilterSession;
pub use format::{format_cell, ColumnFormatter};
pub use layout::{Document, DocumentLayoutEngine, PageGeometry};
pub use session::{ReportSession, SessionEvent, SessionState};
