//! Schedule assembly: validates the five record groups and reshapes them into
//! a [`ScheduleTable`].
//!
//! The solver prints its record as five bracketed lines whose meaning is
//! purely positional. [`SolverRecord`] names each position so the rest of the
//! assembly never indexes into a bare list of groups.

use super::fields::FieldGroup;
use crate::error::ParseError;
use crate::model::{GroupRole, ScalarField, ScalarParameters, ScheduleTable};
use std::str::FromStr;
use tracing::warn;

/// The five field groups of one solver record, by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverRecord {
    pub scalar_parameters: FieldGroup,
    pub assignment_vector: FieldGroup,
    pub scene_labels: FieldGroup,
    pub scene_durations: FieldGroup,
    pub actor_summaries: FieldGroup,
}

impl SolverRecord {
    /// Assign roles to the first five groups. Surplus groups are ignored.
    pub fn from_groups(groups: Vec<FieldGroup>) -> Result<Self, ParseError> {
        let found = groups.len();
        if found < GroupRole::ALL.len() {
            return Err(ParseError::MissingRecordGroup { found });
        }
        if found > GroupRole::ALL.len() {
            warn!(found, "ignoring record groups after the fifth");
        }

        let mut groups = groups.into_iter();
        let mut next = || groups.next().unwrap_or_default();
        Ok(Self {
            scalar_parameters: next(),
            assignment_vector: next(),
            scene_labels: next(),
            scene_durations: next(),
            actor_summaries: next(),
        })
    }

    pub fn group(&self, role: GroupRole) -> &FieldGroup {
        match role {
            GroupRole::ScalarParameters => &self.scalar_parameters,
            GroupRole::AssignmentVector => &self.assignment_vector,
            GroupRole::SceneLabels => &self.scene_labels,
            GroupRole::SceneDurations => &self.scene_durations,
            GroupRole::ActorSummaries => &self.actor_summaries,
        }
    }

    /// Parse `[numberOfActors, numberOfScenes, cost(, timeShared)]`.
    pub fn scalars(&self) -> Result<ScalarParameters, ParseError> {
        let tokens = &self.scalar_parameters;
        if tokens.len() > 4 {
            warn!(
                tokens = tokens.len(),
                "ignoring scalar parameters after timeShared"
            );
        }

        Ok(ScalarParameters {
            actors: parse_scalar(tokens, 0, ScalarField::NumberOfActors)?,
            scenes: parse_scalar(tokens, 1, ScalarField::NumberOfScenes)?,
            cost: parse_scalar(tokens, 2, ScalarField::Cost)?,
            time_shared: match tokens.get(3) {
                Some(_) => Some(parse_scalar(tokens, 3, ScalarField::TimeShared)?),
                None => None,
            },
        })
    }

    /// Check group lengths against the scalars, in group order.
    pub fn check_lengths(&self, scalars: &ScalarParameters) -> Result<(), ParseError> {
        let expectations = [
            (
                GroupRole::AssignmentVector,
                scalars.actors.saturating_mul(scalars.scenes),
            ),
            (GroupRole::SceneLabels, scalars.scenes),
            (GroupRole::SceneDurations, scalars.scenes),
            (GroupRole::ActorSummaries, scalars.actors),
        ];
        for (group, expected) in expectations {
            let actual = self.group(group).len();
            if actual != expected {
                return Err(ParseError::LengthMismatch {
                    group,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

fn parse_scalar<T: FromStr>(
    tokens: &[String],
    index: usize,
    field: ScalarField,
) -> Result<T, ParseError> {
    let value = tokens.get(index).map(String::as_str).unwrap_or_default();
    value.trim().parse().map_err(|_| ParseError::NonNumericScalar {
        field,
        value: value.to_string(),
    })
}

/// Split `flat` into `rows` rows of `cols` contiguous elements.
///
/// `flat.len()` must equal `rows * cols`.
pub fn reshape_row_major<T: Clone>(flat: &[T], rows: usize, cols: usize) -> Vec<Vec<T>> {
    (0..rows)
        .map(|i| flat[i * cols..(i + 1) * cols].to_vec())
        .collect()
}

/// Build the schedule table from split field groups.
pub fn assemble(groups: Vec<FieldGroup>) -> Result<ScheduleTable, ParseError> {
    let record = SolverRecord::from_groups(groups)?;
    let scalars = record.scalars()?;
    record.check_lengths(&scalars)?;

    let assignments = reshape_row_major(&record.assignment_vector, scalars.actors, scalars.scenes);

    let mut headers = Vec::with_capacity(scalars.scenes + 2);
    headers.push("Scene".to_string());
    headers.extend(record.scene_labels.iter().cloned());
    headers.push("Cost".to_string());

    let mut rows = Vec::with_capacity(scalars.actors + 1);
    for (i, (assigned, summary)) in assignments
        .into_iter()
        .zip(&record.actor_summaries)
        .enumerate()
    {
        let mut row = Vec::with_capacity(scalars.scenes + 2);
        row.push(format!("Actor{}", i + 1));
        row.extend(assigned);
        row.push(summary.clone());
        rows.push(row);
    }

    let mut duration = Vec::with_capacity(scalars.scenes + 2);
    duration.push("Duration".to_string());
    duration.extend(record.scene_durations.iter().cloned());
    duration.push(scalars.cost.to_string());
    rows.push(duration);

    Ok(ScheduleTable::new(
        headers,
        rows,
        scalars.cost,
        scalars.time_shared,
    ))
}
