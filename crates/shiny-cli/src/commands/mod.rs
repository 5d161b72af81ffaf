pub mod convert;
pub mod import;
pub mod list;

use shiny_port::{BatchReport, EntryStatus};

/// Turn a finished batch into the command result: the report itself is
/// printed by the caller, failures make the command exit non-zero.
fn check_report(report: &BatchReport, verb: &str) -> Result<(), String> {
    let failed = report.count(EntryStatus::Failed);
    if failed == 0 {
        return Ok(());
    }
    let total = report.entries().len();
    Err(format!(
        "{failed} of {total} area{} failed to {verb}",
        if total == 1 { "" } else { "s" }
    ))
}
