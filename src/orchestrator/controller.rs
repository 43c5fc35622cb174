//! Run lifecycle controller.
//!
//! Owns start/restart/quit orchestration and emits events for presentation
//! layers. At most one run is in flight; a restart cancels the active run and
//! drops its parser state before the next one starts.

use crate::engine::ScheduleParser;
use crate::error::ProcessFailure;
use crate::model::{AppEvent, RunOutcome, RunRequest};
use crate::runner::ProcessRunner;
use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Commands emitted by UI layers to control the active run.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Restart,
    Quit,
}

/// Internal handle for a running solver run.
pub(crate) struct RunCtx {
    handle: Option<tokio::task::JoinHandle<RunOutcome>>,
}

impl RunCtx {
    /// Wait for the run to finish. A cancelled or panicked run task
    /// surfaces as a terminated process with no schedule.
    pub(crate) async fn finish(mut self, request: RunRequest) -> RunOutcome {
        match self.handle.take() {
            Some(handle) => join_outcome(handle.await, request),
            None => discarded(request, "run was not started".into()),
        }
    }
}

fn join_outcome(
    joined: Result<RunOutcome, tokio::task::JoinError>,
    request: RunRequest,
) -> RunOutcome {
    match joined {
        Ok(outcome) => outcome,
        Err(e) if e.is_cancelled() => discarded(request, "run cancelled".into()),
        Err(e) => discarded(request, format!("run task failed: {e}")),
    }
}

fn discarded(request: RunRequest, reason: String) -> RunOutcome {
    RunOutcome {
        timestamp_utc: now_rfc3339(),
        request,
        process: Err(ProcessFailure::Terminated { reason }),
        schedule: None,
    }
}

pub(crate) fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}

/// Spawn a new run and return its control handle.
pub(crate) fn start_run<R: ProcessRunner>(runner: &R, request: RunRequest) -> RunCtx {
    let runner = runner.clone();
    let handle = tokio::spawn(async move { execute_run(&runner, request).await });
    RunCtx {
        handle: Some(handle),
    }
}

/// Drive one run to completion: stream lines from the runner into a fresh
/// parser, then assemble once the stream ends.
pub(crate) async fn execute_run<R: ProcessRunner>(runner: &R, request: RunRequest) -> RunOutcome {
    debug!(solver = %request.solver, "run started");
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();

    let consume = async {
        let mut parser = ScheduleParser::new();
        while let Some(line) = line_rx.recv().await {
            parser.push_line(&line);
        }
        parser
    };
    let (process, parser) = tokio::join!(runner.run(&request, line_tx), consume);
    debug!(
        lines = parser.lines_seen(),
        groups = parser.groups_seen(),
        "solver output ended"
    );

    let schedule = match &process {
        Err(failure) if !failure.keeps_output() => {
            debug!(
                groups = parser.groups_seen(),
                %failure,
                "discarding output of terminated run"
            );
            None
        }
        _ => Some(parser.finish()),
    };

    debug!(
        process_ok = process.is_ok(),
        schedule_ok = matches!(schedule, Some(Ok(_))),
        "run finished"
    );
    RunOutcome {
        timestamp_utc: now_rfc3339(),
        request,
        process,
        schedule,
    }
}

/// Orchestrate runs based on UI commands and emit events back to presentation layers.
pub(crate) async fn run_controller<R: ProcessRunner>(
    runner: &R,
    request: &RunRequest,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let launch = |event_tx: &UnboundedSender<AppEvent>| {
        let _ = event_tx.send(AppEvent::RunStarted {
            request: request.clone(),
        });
        start_run(runner, request.clone())
    };

    let mut run_ctx = Some(launch(&event_tx));
    let mut restart_pending = false;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Restart) => {
                        // Restart is serialized: cancel the active run first, then start a
                        // new one once its completion is observed.
                        match &run_ctx {
                            Some(ctx) => {
                                if let Some(h) = &ctx.handle {
                                    h.abort();
                                }
                                restart_pending = true;
                                let _ = event_tx.send(AppEvent::Info("Cancelling…".into()));
                            }
                            None => {
                                let _ = event_tx.send(AppEvent::Info("Restarting…".into()));
                                run_ctx = Some(launch(&event_tx));
                            }
                        }
                    }
                    Some(UiCommand::Quit) | None => {
                        if let Some(h) = run_ctx.as_ref().and_then(|ctx| ctx.handle.as_ref()) {
                            h.abort();
                        }
                        break Ok(());
                    }
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it can be dropped
            // if another select branch is chosen, and we'll never observe completion.
            maybe_done = async {
                if let Some(ctx) = &mut run_ctx {
                    if let Some(h) = ctx.handle.as_mut() {
                        return Some(h.await);
                    }
                }
                futures::future::pending().await
            } => {
                if let Some(joined) = maybe_done {
                    run_ctx = None;
                    if restart_pending {
                        restart_pending = false;
                        let _ = event_tx.send(AppEvent::Info("Restarting…".into()));
                        run_ctx = Some(launch(&event_tx));
                    } else {
                        let outcome = join_outcome(joined, request.clone());
                        let _ = event_tx.send(AppEvent::RunCompleted { outcome: Box::new(outcome) });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::runner::ScriptedRunner;

    const TRANSCRIPT: &[&str] = &[
        "[3,2,10]",
        "[1,2,1,2,1,2]",
        "[SceneA,SceneB]",
        "[4,5]",
        "[3,4,3]",
        "----------",
    ];

    fn request() -> RunRequest {
        RunRequest {
            solver: "Chuffed".into(),
            model_path: Some("model.mzn".into()),
            data_path: Some("data.dzn".into()),
        }
    }

    #[tokio::test]
    async fn successful_run_produces_table() {
        let outcome = execute_run(&ScriptedRunner::new(TRANSCRIPT), request()).await;
        assert!(outcome.is_success());
        let table = outcome.table().unwrap();
        assert_eq!(table.rows().len(), 4);
        assert_eq!(outcome.request, request());
    }

    #[tokio::test]
    async fn non_zero_exit_still_parses_output() {
        let runner = ScriptedRunner::new(TRANSCRIPT)
            .exiting_with(Err(ProcessFailure::NonZeroExit { code: 1 }));
        let outcome = execute_run(&runner, request()).await;
        assert_eq!(
            outcome.process,
            Err(ProcessFailure::NonZeroExit { code: 1 })
        );
        assert!(outcome.table().is_some());
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn terminated_run_discards_groups() {
        let runner = ScriptedRunner::new(TRANSCRIPT).exiting_with(Err(
            ProcessFailure::Terminated {
                reason: "killed".into(),
            },
        ));
        let outcome = execute_run(&runner, request()).await;
        assert!(outcome.schedule.is_none());
    }

    #[tokio::test]
    async fn parse_failure_is_reported_with_process_success() {
        let outcome = execute_run(&ScriptedRunner::new(&["[3,2,10]"]), request()).await;
        assert!(outcome.process.is_ok());
        assert_eq!(
            outcome.parse_error(),
            Some(&ParseError::MissingRecordGroup { found: 1 })
        );
    }

    #[tokio::test]
    async fn runs_do_not_share_state() {
        let runner = ScriptedRunner::new(&TRANSCRIPT[..3]);
        let first = start_run(&runner, request()).finish(request()).await;
        let second = start_run(&runner, request()).finish(request()).await;
        // Each run sees only its own three groups, never six.
        assert_eq!(
            first.parse_error(),
            Some(&ParseError::MissingRecordGroup { found: 3 })
        );
        assert_eq!(first.parse_error(), second.parse_error());
    }

    #[tokio::test]
    async fn controller_reports_completion_and_quits() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let runner = ScriptedRunner::new(TRANSCRIPT);
        let req = request();

        let controller = tokio::spawn(async move {
            run_controller(&runner, &req, event_tx, cmd_rx).await
        });

        assert!(matches!(
            event_rx.recv().await,
            Some(AppEvent::RunStarted { .. })
        ));
        match event_rx.recv().await {
            Some(AppEvent::RunCompleted { outcome }) => assert!(outcome.is_success()),
            other => panic!("unexpected event: {other:?}"),
        }

        cmd_tx.send(UiCommand::Quit).unwrap();
        controller.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn restart_cancels_active_run_before_starting_next() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let runner = ScriptedRunner::new(TRANSCRIPT).hanging();
        let req = request();

        let controller = tokio::spawn(async move {
            run_controller(&runner, &req, event_tx, cmd_rx).await
        });

        assert!(matches!(
            event_rx.recv().await,
            Some(AppEvent::RunStarted { .. })
        ));
        cmd_tx.send(UiCommand::Restart).unwrap();

        let mut saw_cancel = false;
        loop {
            match event_rx.recv().await {
                Some(AppEvent::Info(msg)) if msg.starts_with("Cancelling") => saw_cancel = true,
                Some(AppEvent::Info(_)) => {}
                Some(AppEvent::RunStarted { .. }) => break,
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert!(saw_cancel);

        cmd_tx.send(UiCommand::Quit).unwrap();
        controller.await.unwrap().unwrap();
    }
}
