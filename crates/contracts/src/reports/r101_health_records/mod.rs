use super::common::ReportMetadata;
use crate::shared::report::{
    ColumnDescriptor, FilterDescriptor, Orientation, ReportDefinition, SelectOption,
};

pub const BLOOD_TYPES: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Resident health records. Wide table, printed in landscape.
pub struct HealthRecords;

impl ReportMetadata for HealthRecords {
    fn report_index() -> &'static str {
        "r101"
    }

    fn report_name() -> &'static str {
        "health_records"
    }

    fn display_name() -> &'static str {
        "Resident Health Records Report"
    }

    fn description() -> &'static str {
        "Health profile of residents filtered by purok, blood type and checkup date"
    }

    fn definition() -> ReportDefinition {
        let blood_types = BLOOD_TYPES
            .iter()
            .map(|t| SelectOption::new(*t, *t))
            .collect();

        ReportDefinition {
            id: Self::full_name(),
            title: Self::display_name().to_string(),
            columns: vec![
                ColumnDescriptor::text("residentName", "Resident"),
                ColumnDescriptor::text("purok", "Purok"),
                ColumnDescriptor::text("bloodType", "Blood Type").with_width(20.0),
                ColumnDescriptor::number("age", "Age").with_width(14.0),
                ColumnDescriptor::text("condition", "Medical Condition"),
                ColumnDescriptor::date("lastCheckup", "Last Checkup"),
                ColumnDescriptor::currency("maintenanceCost", "Maintenance Cost"),
                ColumnDescriptor::text("contactNo", "Contact No."),
            ],
            filters: vec![
                FilterDescriptor::text("purok", "Purok"),
                FilterDescriptor::select("bloodType", "Blood Type", blood_types),
                FilterDescriptor::text("residentName", "Resident Name"),
                FilterDescriptor::tel("contactNo", "Contact No."),
            ],
            date_range_enabled: true,
            orientation: Orientation::Landscape,
        }
    }
}
