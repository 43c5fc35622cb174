use crate::model::{AppEvent, RunOutcome, RunRequest};
use crate::render::TableRenderer;
use anyhow::Result;
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};

pub struct UiState {
    pub show_help: bool,
    pub running: bool,
    pub info: String,
    pub request: Option<RunRequest>,

    // Table of the last successful run; replaced wholesale, never patched.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_offset: usize,

    pub last_outcome: Option<RunOutcome>,
    pub last_exported_path: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_help: false,
            running: false,
            info: String::new(),
            request: None,
            headers: Vec::new(),
            rows: Vec::new(),
            row_offset: 0,
            last_outcome: None,
            last_exported_path: None,
        }
    }
}

impl TableRenderer for UiState {
    fn display(&mut self, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
        self.headers = headers.to_vec();
        self.rows = rows.to_vec();
        self.row_offset = 0;
        Ok(())
    }
}

impl UiState {
    /// Drop everything the previous run left behind.
    pub fn reset_run(&mut self) {
        self.headers.clear();
        self.rows.clear();
        self.row_offset = 0;
        self.last_outcome = None;
    }

    pub fn apply_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::RunStarted { request } => {
                self.reset_run();
                self.running = true;
                self.info = format!("Reading {} output…", request.solver);
                self.request = Some(request);
            }
            AppEvent::Info(msg) => {
                self.info = msg;
            }
            AppEvent::RunCompleted { outcome } => {
                self.running = false;
                self.info = if outcome.is_success() {
                    "Run complete".into()
                } else {
                    match (&outcome.process, outcome.parse_error()) {
                        (Err(e), _) => format!("Run failed: {e}"),
                        (Ok(()), Some(e)) => format!("Parse failed: {e}"),
                        (Ok(()), None) => "Run produced no schedule".into(),
                    }
                };
                if let Some(table) = outcome.table() {
                    // Storing into Vec-backed state cannot fail.
                    let _ = self.display(table.headers(), table.rows());
                }
                self.last_outcome = Some(*outcome);
            }
        }
    }

    pub fn scroll_down(&mut self) {
        if self.row_offset + 1 < self.rows.len() {
            self.row_offset += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.row_offset = self.row_offset.saturating_sub(1);
    }

    /// Status panel lines for the current run.
    pub fn status_lines(&self) -> Vec<Line<'static>> {
        let mut out = Vec::new();
        if let Some(req) = &self.request {
            push_status_kv(&mut out, "Solver", &req.solver, Color::Gray);
            if let Some(p) = &req.model_path {
                push_status_kv(&mut out, "Model", &p.display().to_string(), Color::Gray);
            }
            if let Some(p) = &req.data_path {
                push_status_kv(&mut out, "Data", &p.display().to_string(), Color::Gray);
            }
        }

        if let Some(outcome) = &self.last_outcome {
            match &outcome.process {
                Ok(()) => push_status_kv(&mut out, "Process", "ok", Color::Green),
                Err(e) => push_status_kv(&mut out, "Process", &e.to_string(), Color::Red),
            }
            if let Some(table) = outcome.table() {
                push_status_kv(&mut out, "Cost", &table.cost().to_string(), Color::Gray);
                if let Some(shared) = table.time_shared() {
                    push_status_kv(&mut out, "Time shared", &shared.to_string(), Color::Gray);
                }
            }
            if let Some(e) = outcome.parse_error() {
                push_status_kv(&mut out, e.kind(), &e.to_string(), Color::Red);
            }
        } else if self.running {
            push_status_kv(&mut out, "Process", "running", Color::Yellow);
        }
        if let Some(path) = &self.last_exported_path {
            push_status_kv(&mut out, "Exported", path, Color::Gray);
        }
        out
    }
}

fn push_status_kv(out: &mut Vec<Line<'static>>, label: &str, value: &str, color: Color) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    out.push(Line::from(vec![
        Span::styled(format!("{label}:"), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(value.to_string(), Style::default().fg(color)),
    ]));
}
