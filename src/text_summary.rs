//! Text summary builder for CLI output.
//!
//! This module formats a completed run as human-readable lines for text mode.

use crate::model::RunOutcome;
use crate::render::{TableRenderer, TextTable};
use anyhow::Result;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    /// Table and metrics, for stdout.
    pub lines: Vec<String>,
    /// Run status, for stderr.
    pub status: Vec<String>,
}

/// Build a text summary from a completed run.
pub(crate) fn build_text_summary(outcome: &RunOutcome) -> Result<TextSummary> {
    let mut lines = Vec::new();
    let mut status = Vec::new();

    status.push(format!("Solver: {}", outcome.request.solver));
    if let Some(model) = outcome.request.model_path.as_deref() {
        status.push(format!("Model: {}", model.display()));
    }
    if let Some(data) = outcome.request.data_path.as_deref() {
        status.push(format!("Data: {}", data.display()));
    }

    if let Some(table) = outcome.table() {
        status.push(format!(
            "Schedule: {} actors, {} scenes",
            table.actor_count(),
            table.scene_count()
        ));
        let mut text = TextTable::default();
        text.display(table.headers(), table.rows())?;
        lines.extend(text.lines);
        if let Some(shared) = table.time_shared() {
            lines.push(String::new());
            lines.push(format!("Time shared: {shared}"));
        }
    }

    match &outcome.process {
        Ok(()) => {}
        Err(e) => status.push(format!("Process: {e}")),
    }
    match &outcome.schedule {
        Some(Ok(_)) => {}
        Some(Err(e)) => status.push(format!("Parse error ({}): {e}", e.kind())),
        None => status.push("Output discarded: run did not complete".into()),
    }

    Ok(TextSummary { lines, status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessFailure;
    use crate::model::{RunRequest, ScheduleTable};

    fn outcome(time_shared: Option<i64>) -> RunOutcome {
        RunOutcome {
            timestamp_utc: "2020-04-27T00:00:00Z".into(),
            request: RunRequest {
                solver: "Gecode".into(),
                model_path: Some("film.mzn".into()),
                data_path: None,
            },
            process: Ok(()),
            schedule: Some(Ok(ScheduleTable::new(
                vec!["Scene".into(), "S".into(), "Cost".into()],
                vec![
                    vec!["Actor1".into(), "1".into(), "2".into()],
                    vec!["Duration".into(), "3".into(), "2".into()],
                ],
                2,
                time_shared,
            ))),
        }
    }

    #[test]
    fn prints_table_and_shared_time() {
        let summary = build_text_summary(&outcome(Some(5))).unwrap();
        assert_eq!(summary.lines[0], "Scene     S  Cost");
        assert_eq!(summary.lines.last().unwrap(), "Time shared: 5");
        assert_eq!(
            summary.status,
            [
                "Solver: Gecode",
                "Model: film.mzn",
                "Schedule: 1 actors, 1 scenes"
            ]
        );
    }

    #[test]
    fn omits_shared_time_when_not_reported() {
        let summary = build_text_summary(&outcome(None)).unwrap();
        assert_eq!(summary.lines.len(), 3);
        assert!(!summary.lines.iter().any(|l| l.starts_with("Time shared")));
    }

    #[test]
    fn reports_failures_on_status_lines() {
        let mut o = outcome(None);
        o.process = Err(ProcessFailure::Terminated {
            reason: "killed".into(),
        });
        o.schedule = None;
        let summary = build_text_summary(&o).unwrap();
        assert!(summary.lines.is_empty());
        assert!(summary.status.iter().any(|l| l == "Process: solver terminated: killed"));
        assert!(summary.status.iter().any(|l| l.starts_with("Output discarded")));
    }
}
