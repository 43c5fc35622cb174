mod assembler;
mod brackets;
mod fields;

use assembler::assemble;
use brackets::BracketExtractor;
use fields::{split_fields, FieldGroup};

use crate::error::ParseError;
use crate::model::ScheduleTable;
use tracing::{debug, trace};

/// Per-run parser state. Create one for each run and drop it with the run;
/// nothing carries over between runs.
#[derive(Debug, Default)]
pub struct ScheduleParser {
    extractor: BracketExtractor,
    lines_seen: usize,
}

impl ScheduleParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line of solver output.
    pub fn push_line(&mut self, line: &str) {
        trace!(line = %line, "solver output");
        self.lines_seen += 1;
        self.extractor.push_line(line);
    }

    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    pub fn groups_seen(&self) -> usize {
        self.extractor.len()
    }

    /// Split every collected group and assemble the schedule.
    pub fn finish(self) -> Result<ScheduleTable, ParseError> {
        debug!(groups = self.extractor.len(), "assembling schedule");
        let groups: Vec<FieldGroup> = self
            .extractor
            .into_groups()
            .iter()
            .map(|raw| split_fields(raw))
            .collect();
        assemble(groups)
    }
}
