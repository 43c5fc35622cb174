//! Error types for solver output handling.
//!
//! Parse errors and process failures are separate types: a run reports both
//! side by side rather than folding one into the other.

use crate::model::{GroupRole, ScalarField};
use thiserror::Error;

/// Why a set of bracketed groups could not be assembled into a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected 5 record groups in solver output, found {found}")]
    MissingRecordGroup { found: usize },

    #[error("{field} is not an integer: {value:?}")]
    NonNumericScalar { field: ScalarField, value: String },

    #[error("{group} has {actual} entries, expected {expected}")]
    LengthMismatch {
        group: GroupRole,
        expected: usize,
        actual: usize,
    },
}

impl ParseError {
    /// Stable name of the error kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::MissingRecordGroup { .. } => "MissingRecordGroup",
            ParseError::NonNumericScalar { .. } => "NonNumericScalar",
            ParseError::LengthMismatch { .. } => "LengthMismatch",
        }
    }
}

/// Abnormal end of the external solver process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessFailure {
    /// Exited normally with a failure code. Output already emitted is still parsed.
    #[error("solver exited with status {code}")]
    NonZeroExit { code: i32 },

    /// Stopped before finishing; whatever it emitted is discarded.
    #[error("solver terminated: {reason}")]
    Terminated { reason: String },

    /// Output could not be obtained at all.
    #[error("solver output unavailable: {reason}")]
    Unavailable { reason: String },
}

impl ProcessFailure {
    /// Whether lines emitted before the failure may still be assembled.
    pub fn keeps_output(&self) -> bool {
        matches!(self, ProcessFailure::NonZeroExit { .. })
    }
}
