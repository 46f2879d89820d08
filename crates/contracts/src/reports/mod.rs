//! Catalogue of report types offered by the records application

pub mod common;
pub mod r100_households;
pub mod r101_health_records;
pub mod r102_referrals;

pub use common::ReportMetadata;

use crate::shared::report::ReportDefinition;

/// All shipped report definitions, in menu order
pub fn catalogue() -> Vec<ReportDefinition> {
    vec![
        r100_households::HouseholdRoster::definition(),
        r101_health_records::HealthRecords::definition(),
        r102_referrals::Referrals::definition(),
    ]
}

/// Look up a report by its full name ("r101_health_records") or bare index ("r101")
pub fn find(name: &str) -> Option<ReportDefinition> {
    catalogue()
        .into_iter()
        .find(|def| def.id == name || def.id.split('_').next() == Some(name))
}
