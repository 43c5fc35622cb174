use crate::model::RunOutcome;
use anyhow::{Context, Result};
use std::path::PathBuf;

use super::state::UiState;

fn default_path(r: &RunOutcome, ext: &str) -> Result<PathBuf> {
    // Generate a default filename based on timestamp
    let default_name = format!(
        "schedule-{}-{}.{ext}",
        r.request.solver.to_lowercase(),
        r.timestamp_utc.replace(':', "-").replace('T', "_"),
    );

    // Get absolute path from current directory
    let current_dir = std::env::current_dir().context("get current directory")?;
    Ok(current_dir.join(default_name))
}

/// Export the run report as JSON into the current directory.
/// Returns the absolute path of the exported file.
pub fn export_result_json(r: &RunOutcome) -> Result<PathBuf> {
    let path = default_path(r, "json")?;
    crate::storage::export_json(&path, &r.to_report())?;
    Ok(path)
}

/// Export the schedule table as CSV into the current directory.
/// Returns the absolute path of the exported file.
pub fn export_result_csv(r: &RunOutcome) -> Result<PathBuf> {
    let table = r
        .table()
        .context("no schedule to export: the last run did not produce one")?;
    let path = default_path(r, "csv")?;
    crate::storage::export_csv(&path, table)?;
    Ok(path)
}

/// Run an export and record the result in `state.info`.
pub fn export_and_show_path(
    state: &mut UiState,
    label: &str,
    export: fn(&RunOutcome) -> Result<PathBuf>,
) {
    let Some(outcome) = state.last_outcome.as_ref() else {
        state.info = "Nothing to export yet".into();
        return;
    };
    match export(outcome) {
        Ok(path) => {
            let shown = path.display().to_string();
            state.info = format!("Exported {label}: {shown}");
            state.last_exported_path = Some(shown);
        }
        Err(e) => {
            state.info = format!("Export {label} failed: {e:#}");
        }
    }
}
