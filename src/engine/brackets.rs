//! Bracketed group extraction from raw solver lines.

use tracing::warn;

/// Text found strictly between one `[` and the next `]` on a line.
pub type RawGroup = String;

/// Collects raw groups in encounter order across every line of one run.
#[derive(Debug, Default)]
pub struct BracketExtractor {
    groups: Vec<RawGroup>,
}

impl BracketExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every bracketed group found on `line`, left to right.
    pub fn push_line(&mut self, line: &str) {
        let mut rest = line;
        while let Some(open) = rest.find('[') {
            let body = &rest[open + 1..];
            match body.find(']') {
                Some(close) => {
                    self.groups.push(body[..close].to_string());
                    rest = &body[close + 1..];
                }
                None => {
                    warn!(line = %line, "discarding unmatched '[' in solver output");
                    break;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn into_groups(self) -> Vec<RawGroup> {
        self.groups
    }
}
