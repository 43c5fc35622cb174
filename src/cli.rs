use crate::model::{RunOutcome, RunRequest};
use crate::orchestrator::{self, ExportTargets};
use crate::runner::{TranscriptRunner, TranscriptSource};
use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "solver-schedule",
    version,
    about = "Show constraint-solver scene scheduling output as an actor/scene table"
)]
pub struct Cli {
    /// Captured solver output to read (defaults to stdin)
    #[arg(long, env = "SOLVER_SCHEDULE_INPUT")]
    pub input: Option<PathBuf>,

    /// Solver backend the output came from
    #[arg(long, env = "SOLVER_SCHEDULE_SOLVER", default_value = "Chuffed")]
    pub solver: String,

    /// Model file (.mzn) the run was made with
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Data file (.dzn) the run was made with
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Print JSON report and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print text table and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Export the run report as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Export the schedule table as CSV
    #[arg(long)]
    pub export_csv: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Whether this invocation prints and exits instead of opening the TUI.
    pub fn is_non_tui(&self) -> bool {
        self.json || self.text || cfg!(not(feature = "tui"))
    }

    pub fn export_targets(&self) -> ExportTargets<'_> {
        ExportTargets {
            json: self.export_json.as_deref(),
            csv: self.export_csv.as_deref(),
        }
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!(
            "--json and --text are mutually exclusive. Pick one output mode."
        ));
    }

    let runner = build_runner(&args);
    let request = build_request(&args);

    if !args.is_non_tui() {
        #[cfg(feature = "tui")]
        {
            use std::io::IsTerminal;
            ensure_tui_input(&runner, std::io::stdin().is_terminal())?;
            let can_rerun = !runner.reads_stdin();
            return crate::tui::run(args, runner, request, can_rerun).await;
        }
    }

    let outcome = orchestrator::start_run(&runner, request.clone())
        .finish(request)
        .await;
    if args.json {
        run_json(&args, &outcome).await
    } else {
        run_text(&args, &outcome).await
    }
}

/// Build the run request from CLI arguments.
pub fn build_request(args: &Cli) -> RunRequest {
    RunRequest {
        solver: args.solver.clone(),
        model_path: args.model.clone(),
        data_path: args.data.clone(),
    }
}

pub fn build_runner(args: &Cli) -> TranscriptRunner {
    let source = match &args.input {
        Some(path) if path.as_os_str() != "-" => TranscriptSource::File(path.clone()),
        _ => TranscriptSource::Stdin,
    };
    TranscriptRunner::new(source)
}

/// The TUI reads keys from the terminal, so solver output must come from
/// somewhere else.
#[cfg(feature = "tui")]
fn ensure_tui_input(runner: &TranscriptRunner, stdin_is_terminal: bool) -> Result<()> {
    if runner.reads_stdin() && stdin_is_terminal {
        return Err(anyhow::anyhow!(
            "no solver output to read: stdin is a terminal. Pass --input <FILE>, pipe the output in, or use --text/--json."
        ));
    }
    Ok(())
}

async fn run_json(args: &Cli, outcome: &RunOutcome) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let processed = orchestrator::process_run_completion(outcome, &args.export_targets());

    let out = serde_json::to_string_pretty(&processed.report)?;
    let _ = out_tx.send(OutputLine::Stdout(out));
    for msg in processed.export_messages {
        let _ = out_tx.send(OutputLine::Stderr(msg));
    }

    drop(out_tx);
    let _ = out_handle.await;
    outcome.ensure_success()
}

async fn run_text(args: &Cli, outcome: &RunOutcome) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let processed = orchestrator::process_run_completion(outcome, &args.export_targets());

    let summary = crate::text_summary::build_text_summary(outcome)?;
    for line in summary.status {
        let _ = out_tx.send(OutputLine::Stderr(line));
    }
    for line in summary.lines {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }
    for msg in processed.export_messages {
        let _ = out_tx.send(OutputLine::Stderr(msg));
    }

    drop(out_tx);
    let _ = out_handle.await;
    outcome.ensure_success()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Cli::parse_from(["solver-schedule", "--text"]);
        assert_eq!(args.solver, "Chuffed");
        assert!(args.input.is_none());
        assert!(args.is_non_tui());
    }

    #[test]
    fn request_carries_solver_and_paths() {
        let args = Cli::parse_from([
            "solver-schedule",
            "--solver",
            "Gecode",
            "--model",
            "film.mzn",
            "--data",
            "film.dzn",
        ]);
        let req = build_request(&args);
        assert_eq!(req.solver, "Gecode");
        assert_eq!(req.model_path.as_deref(), Some(std::path::Path::new("film.mzn")));
        assert_eq!(req.data_path.as_deref(), Some(std::path::Path::new("film.dzn")));
    }

    #[test]
    fn dash_input_means_stdin() {
        let args = Cli::parse_from(["solver-schedule", "--input", "-"]);
        let runner = build_runner(&args);
        let debug = format!("{runner:?}");
        assert!(debug.contains("Stdin"), "{debug}");
    }

    #[cfg(feature = "tui")]
    #[test]
    fn tui_rejects_terminal_stdin() {
        let args = Cli::parse_from(["solver-schedule"]);
        let runner = build_runner(&args);
        let err = ensure_tui_input(&runner, true).unwrap_err();
        assert!(err.to_string().contains("--input"), "{err}");

        assert!(ensure_tui_input(&runner, false).is_ok());
        assert!(runner.reads_stdin());
    }

    #[cfg(feature = "tui")]
    #[test]
    fn tui_accepts_file_input_on_a_terminal() {
        let args = Cli::parse_from(["solver-schedule", "--input", "run.txt"]);
        let runner = build_runner(&args);
        assert!(!runner.reads_stdin());
        assert!(ensure_tui_input(&runner, true).is_ok());
    }

    #[tokio::test]
    async fn json_and_text_are_exclusive() {
        let args = Cli::parse_from(["solver-schedule", "--json", "--text"]);
        assert!(run(args).await.is_err());
    }
}
