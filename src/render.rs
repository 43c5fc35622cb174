//! Table renderer seam.

use anyhow::Result;

/// Receives a finished schedule for display.
pub trait TableRenderer {
    fn display(&mut self, headers: &[String], rows: &[Vec<String>]) -> Result<()>;
}

/// Renders a table as column-aligned plain text lines.
#[derive(Debug, Default)]
pub struct TextTable {
    pub lines: Vec<String>,
}

impl TableRenderer for TextTable {
    fn display(&mut self, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
        let columns = std::iter::once(headers.len())
            .chain(rows.iter().map(Vec::len))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for record in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
            for (w, cell) in widths.iter_mut().zip(record) {
                *w = (*w).max(cell.chars().count());
            }
        }

        for record in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
            let cells: Vec<String> = record
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{cell:<w$}"))
                .collect();
            self.lines.push(cells.join("  ").trim_end().to_string());
        }
        Ok(())
    }
}
