use crate::shared::report::ReportDefinition;

/// Identification of a report type, mirrors the index/name scheme of the catalogue
pub trait ReportMetadata {
    /// Report index, e.g. "r100"
    fn report_index() -> &'static str;

    /// Technical name, e.g. "households"
    fn report_name() -> &'static str;

    /// Title shown in the menu and printed on the document
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// Full name of the form "r100_households"
    fn full_name() -> String {
        format!("{}_{}", Self::report_index(), Self::report_name())
    }

    fn definition() -> ReportDefinition;
}
