use super::common::ReportMetadata;
use crate::shared::report::{
    ColumnDescriptor, FilterDescriptor, Orientation, ReportDefinition, SelectOption,
};

/// Referrals to outside health facilities
pub struct Referrals;

impl ReportMetadata for Referrals {
    fn report_index() -> &'static str {
        "r102"
    }

    fn report_name() -> &'static str {
        "referrals"
    }

    fn display_name() -> &'static str {
        "Health Referrals Report"
    }

    fn description() -> &'static str {
        "Referral slips issued to residents with facility and status"
    }

    fn definition() -> ReportDefinition {
        let statuses = vec![
            SelectOption::new("pending", "Pending"),
            SelectOption::new("accepted", "Accepted"),
            SelectOption::new("completed", "Completed"),
            SelectOption::new("cancelled", "Cancelled"),
        ];

        ReportDefinition {
            id: Self::full_name(),
            title: Self::display_name().to_string(),
            columns: vec![
                ColumnDescriptor::text("referenceNo", "Reference No.").with_width(26.0),
                ColumnDescriptor::text("residentName", "Resident"),
                ColumnDescriptor::text("facility", "Facility"),
                ColumnDescriptor::text("reason", "Reason"),
                ColumnDescriptor::text("status", "Status").with_width(20.0),
                ColumnDescriptor::date("referredOn", "Referred On"),
            ],
            filters: vec![
                FilterDescriptor::text("residentName", "Resident Name"),
                FilterDescriptor::text("facility", "Facility"),
                FilterDescriptor::select("status", "Status", statuses),
            ],
            date_range_enabled: true,
            orientation: Orientation::Portrait,
        }
    }
}
