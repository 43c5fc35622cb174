use crate::error::{ParseError, ProcessFailure};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What the process runner is asked to produce output for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub solver: String,
    pub model_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
}

/// Semantic role of each bracketed group, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRole {
    ScalarParameters,
    AssignmentVector,
    SceneLabels,
    SceneDurations,
    ActorSummaries,
}

impl GroupRole {
    pub const ALL: [GroupRole; 5] = [
        GroupRole::ScalarParameters,
        GroupRole::AssignmentVector,
        GroupRole::SceneLabels,
        GroupRole::SceneDurations,
        GroupRole::ActorSummaries,
    ];

    /// Zero-based position of the group in the solver output.
    pub fn index(self) -> usize {
        match self {
            GroupRole::ScalarParameters => 0,
            GroupRole::AssignmentVector => 1,
            GroupRole::SceneLabels => 2,
            GroupRole::SceneDurations => 3,
            GroupRole::ActorSummaries => 4,
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupRole::ScalarParameters => "scalar parameters",
            GroupRole::AssignmentVector => "assignment vector",
            GroupRole::SceneLabels => "scene labels",
            GroupRole::SceneDurations => "scene durations",
            GroupRole::ActorSummaries => "actor summaries",
        };
        write!(f, "{name} (group {})", self.index() + 1)
    }
}

/// Integer fields of the scalar parameters group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    NumberOfActors,
    NumberOfScenes,
    Cost,
    TimeShared,
}

impl fmt::Display for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarField::NumberOfActors => "numberOfActors",
            ScalarField::NumberOfScenes => "numberOfScenes",
            ScalarField::Cost => "cost",
            ScalarField::TimeShared => "timeShared",
        })
    }
}

/// Parsed contents of the scalar parameters group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarParameters {
    pub actors: usize,
    pub scenes: usize,
    pub cost: i64,
    pub time_shared: Option<i64>,
}

/// Assembled actor × scene schedule. Immutable once built; a new run
/// produces a new table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    cost: i64,
    #[serde(default)]
    time_shared: Option<i64>,
}

impl ScheduleTable {
    pub(crate) fn new(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        cost: i64,
        time_shared: Option<i64>,
    ) -> Self {
        Self {
            headers,
            rows,
            cost,
            time_shared,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Actor rows followed by the `Duration` row.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn cost(&self) -> i64 {
        self.cost
    }

    pub fn time_shared(&self) -> Option<i64> {
        self.time_shared
    }

    pub fn actor_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn scene_count(&self) -> usize {
        self.headers.len().saturating_sub(2)
    }
}

/// Everything a single run produced: the process signal and the parse
/// signal, kept side by side.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub timestamp_utc: String,
    pub request: RunRequest,
    pub process: Result<(), ProcessFailure>,
    /// `None` when the run was terminated and its groups were discarded.
    pub schedule: Option<Result<ScheduleTable, ParseError>>,
}

impl RunOutcome {
    pub fn table(&self) -> Option<&ScheduleTable> {
        self.schedule.as_ref().and_then(|s| s.as_ref().ok())
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        self.schedule.as_ref().and_then(|s| s.as_ref().err())
    }

    pub fn is_success(&self) -> bool {
        self.process.is_ok() && self.table().is_some()
    }

    /// Fold both signals into one error for the process exit path.
    pub fn ensure_success(&self) -> anyhow::Result<()> {
        let parse = match &self.schedule {
            Some(Ok(_)) => None,
            Some(Err(e)) => Some(anyhow::Error::new(e.clone())),
            None => Some(anyhow::anyhow!("no schedule was produced")),
        };
        match (&self.process, parse) {
            (Ok(()), None) => Ok(()),
            (Ok(()), Some(e)) => Err(e),
            (Err(p), None) => Err(anyhow::Error::new(p.clone())),
            (Err(p), Some(e)) => Err(e.context(p.to_string())),
        }
    }

    pub fn to_report(&self) -> RunReport {
        RunReport {
            timestamp_utc: self.timestamp_utc.clone(),
            solver: self.request.solver.clone(),
            model_path: self.request.model_path.clone(),
            data_path: self.request.data_path.clone(),
            process_ok: self.process.is_ok(),
            process_error: self.process.as_ref().err().map(|e| e.to_string()),
            schedule: self.table().cloned(),
            parse_error: self.parse_error().map(|e| ParseErrorReport {
                kind: e.kind().to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseErrorReport {
    pub kind: String,
    pub message: String,
}

/// Serializable summary of a run, used by JSON output and exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp_utc: String,
    pub solver: String,
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    pub process_ok: bool,
    #[serde(default)]
    pub process_error: Option<String>,
    #[serde(default)]
    pub schedule: Option<ScheduleTable>,
    #[serde(default)]
    pub parse_error: Option<ParseErrorReport>,
}

/// Events emitted by the run controller for presentation layers.
#[derive(Debug, Clone)]
pub enum AppEvent {
    RunStarted { request: RunRequest },
    Info(String),
    RunCompleted {
        // Box keeps the enum small; outcomes carry whole tables.
        outcome: Box<RunOutcome>,
    },
}
