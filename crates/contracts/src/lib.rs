//! Shared data model for the report generation engine.
//!
//! `shared::report` holds the types exchanged between the filter session,
//! the data source and the layout engine; `reports` is the catalogue of
//! report types the records application ships with.

pub mod reports;
pub mod shared;
