//! Post-run processing utilities.
//!
//! Builds the run report and handles exports after a run completes.

use crate::model::{RunOutcome, RunReport};
use crate::storage;
use std::path::Path;

/// Where a completed run should be exported.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExportTargets<'a> {
    pub json: Option<&'a Path>,
    pub csv: Option<&'a Path>,
}

/// Result of post-run processing, ready for presentation layers.
pub(crate) struct ProcessedRun {
    pub report: RunReport,
    pub export_messages: Vec<String>,
}

/// Process a completed run: build its report and run the requested exports.
pub(crate) fn process_run_completion(outcome: &RunOutcome, targets: &ExportTargets<'_>) -> ProcessedRun {
    let report = outcome.to_report();

    let mut export_messages = Vec::new();
    if let Some(export_path) = targets.json {
        match storage::export_json(export_path, &report) {
            Ok(_) => export_messages.push(format!("Exported JSON: {}", export_path.display())),
            Err(e) => export_messages.push(format!("Export JSON failed: {e:#}")),
        }
    }
    if let Some(export_path) = targets.csv {
        match outcome.table() {
            Some(table) => match storage::export_csv(export_path, table) {
                Ok(_) => export_messages.push(format!("Exported CSV: {}", export_path.display())),
                Err(e) => export_messages.push(format!("Export CSV failed: {e:#}")),
            },
            None => export_messages.push("Export CSV skipped: no schedule was produced".into()),
        }
    }

    ProcessedRun {
        report,
        export_messages,
    }
}
