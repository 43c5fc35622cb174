//! Process runner seam.
//!
//! A runner produces the solver's standard output one line at a time over a
//! channel and resolves to the process outcome once the stream ends.

use crate::error::ProcessFailure;
use crate::model::RunRequest;
use std::future::Future;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

pub trait ProcessRunner: Clone + Send + Sync + 'static {
    /// Stream output lines for `request` into `line_tx`. The sender is dropped
    /// when the returned future completes.
    fn run(
        &self,
        request: &RunRequest,
        line_tx: UnboundedSender<String>,
    ) -> impl Future<Output = Result<(), ProcessFailure>> + Send;
}

/// Where a transcript runner reads captured solver output from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptSource {
    Stdin,
    File(PathBuf),
}

/// Replays solver output that was captured elsewhere (a file, or a pipe on
/// stdin). Locating and launching the solver binary is left to the caller.
#[derive(Debug, Clone)]
pub struct TranscriptRunner {
    source: TranscriptSource,
}

impl TranscriptRunner {
    pub fn new(source: TranscriptSource) -> Self {
        Self { source }
    }

    /// Stdin can be drained only once, so such a runner cannot be rerun.
    pub fn reads_stdin(&self) -> bool {
        self.source == TranscriptSource::Stdin
    }

    async fn open(&self) -> Result<Box<dyn AsyncRead + Unpin + Send>, ProcessFailure> {
        match &self.source {
            TranscriptSource::Stdin => Ok(Box::new(tokio::io::stdin())),
            TranscriptSource::File(path) => {
                let file = tokio::fs::File::open(path).await.map_err(|e| {
                    ProcessFailure::Unavailable {
                        reason: format!("{}: {e}", path.display()),
                    }
                })?;
                Ok(Box::new(file))
            }
        }
    }
}

impl ProcessRunner for TranscriptRunner {
    fn run(
        &self,
        request: &RunRequest,
        line_tx: UnboundedSender<String>,
    ) -> impl Future<Output = Result<(), ProcessFailure>> + Send {
        async move {
            debug!(
                solver = %request.solver,
                model = ?request.model_path,
                data = ?request.data_path,
                source = ?self.source,
                "reading solver output"
            );
            let reader = self.open().await?;
            stream_lines(reader, &line_tx).await
        }
    }
}

async fn stream_lines<R: AsyncRead + Unpin>(
    reader: R,
    line_tx: &UnboundedSender<String>,
) -> Result<(), ProcessFailure> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => return Ok(()),
            Ok(_) => {
                let line = decode_line(&buf);
                // Receiver gone means the run was abandoned.
                if line_tx.send(line).is_err() {
                    return Err(ProcessFailure::Terminated {
                        reason: "output consumer went away".into(),
                    });
                }
            }
            Err(e) => {
                return Err(ProcessFailure::Terminated {
                    reason: format!("reading output failed: {e}"),
                })
            }
        }
    }
}

/// Strip the line terminator and decode, replacing invalid UTF-8 sequences.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Runner with canned output, for tests.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ScriptedRunner {
    pub lines: Vec<String>,
    pub exit: Result<(), ProcessFailure>,
    /// Hold the stream open after the last line until cancelled.
    pub hang: bool,
}

#[cfg(test)]
impl ScriptedRunner {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            exit: Ok(()),
            hang: false,
        }
    }

    pub fn exiting_with(mut self, exit: Result<(), ProcessFailure>) -> Self {
        self.exit = exit;
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }
}

#[cfg(test)]
impl ProcessRunner for ScriptedRunner {
    fn run(
        &self,
        _request: &RunRequest,
        line_tx: UnboundedSender<String>,
    ) -> impl Future<Output = Result<(), ProcessFailure>> + Send {
        async move {
            for line in &self.lines {
                let _ = line_tx.send(line.clone());
            }
            if self.hang {
                futures::future::pending::<()>().await;
            }
            self.exit.clone()
        }
    }
}
