use crate::model::{RunReport, ScheduleTable};
use anyhow::{Context, Result};
use std::path::Path;

/// Write the full run report as pretty JSON.
pub fn export_json(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize run report")?;
    write_file(path, &json)
}

/// Write the schedule table (header row first) as CSV.
pub fn export_csv(path: &Path, table: &ScheduleTable) -> Result<()> {
    write_file(path, &table_to_csv(table))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

pub fn table_to_csv(table: &ScheduleTable) -> String {
    let mut out = String::new();
    for record in std::iter::once(table.headers()).chain(table.rows().iter().map(Vec::as_slice)) {
        let line: Vec<String> = record.iter().map(|field| csv_field(field)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ScheduleTable {
        ScheduleTable::new(
            vec!["Scene".into(), "Act 1, Sc 2".into(), "Cost".into()],
            vec![
                vec!["Actor1".into(), "1".into(), "say \"hi\"".into()],
                vec!["Duration".into(), "4".into(), "10".into()],
            ],
            10,
            Some(2),
        )
    }

    #[test]
    fn csv_quotes_special_fields() {
        assert_eq!(
            table_to_csv(&table()),
            "Scene,\"Act 1, Sc 2\",Cost\nActor1,1,\"say \"\"hi\"\"\"\nDuration,4,10\n"
        );
    }

    #[test]
    fn exports_create_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("schedule.csv");
        export_csv(&path, &table()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Scene,"));
    }

    #[test]
    fn json_export_round_trips_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = RunReport {
            timestamp_utc: "2020-04-27T00:00:00Z".into(),
            solver: "Chuffed".into(),
            model_path: None,
            data_path: None,
            process_ok: true,
            process_error: None,
            schedule: Some(table()),
            parse_error: None,
        };
        export_json(&path, &report).unwrap();
        let back: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.schedule, Some(table()));
        assert_eq!(back.solver, "Chuffed");
    }
}
