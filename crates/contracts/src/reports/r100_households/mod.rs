use super::common::ReportMetadata;
use crate::shared::report::{
    ColumnDescriptor, FilterDescriptor, Orientation, ReportDefinition,
};

/// Household roster: one row per registered household
pub struct HouseholdRoster;

impl ReportMetadata for HouseholdRoster {
    fn report_index() -> &'static str {
        "r100"
    }

    fn report_name() -> &'static str {
        "households"
    }

    fn display_name() -> &'static str {
        "Household Roster Report"
    }

    fn description() -> &'static str {
        "Registered households with head of family, purok and monthly income"
    }

    fn definition() -> ReportDefinition {
        ReportDefinition {
            id: Self::full_name(),
            title: Self::display_name().to_string(),
            columns: vec![
                ColumnDescriptor::text("householdNo", "Household No.").with_width(28.0),
                ColumnDescriptor::text("headOfFamily", "Head of Family"),
                ColumnDescriptor::text("purok", "Purok"),
                ColumnDescriptor::number("membersCount", "Members").with_width(20.0),
                ColumnDescriptor::currency("monthlyIncome", "Monthly Income"),
                ColumnDescriptor::date("registeredAt", "Registered"),
            ],
            filters: vec![
                FilterDescriptor::text("purok", "Purok"),
                FilterDescriptor::text("headOfFamily", "Head of Family"),
            ],
            date_range_enabled: true,
            orientation: Orientation::Portrait,
        }
    }
}
