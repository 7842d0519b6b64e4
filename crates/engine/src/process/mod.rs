// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process execution engine
//!
//! Runs one external command and exposes its output as a lazy stream of
//! classified lines. The timeout and the caller's cancellation both stop the
//! process, but only caller cancellation ends the stream early: a timeout is
//! reported to the consumer as an `Error` line.

mod structured;

pub use structured::{parse_structured, StructuredMessage, STRUCTURED_TAG};

use crate::error::ProcessError;
use futures::stream::BoxStream;
use mf_runbook::{split_args, DEFAULT_STEP_TIMEOUT};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Classification of one output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Output,
    Error,
    Completed,
    Cancelled,
}

/// One unit emitted by [`ProcessCommand::execute`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutputLine {
    pub content: String,
    pub kind: OutputKind,
    pub colour: Option<String>,
    pub structured: bool,
    pub exit_code: Option<i32>,
    pub error: Option<ProcessError>,
}

impl ProcessOutputLine {
    pub fn output(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: OutputKind::Output,
            colour: None,
            structured: false,
            exit_code: None,
            error: None,
        }
    }

    pub fn structured(message: StructuredMessage) -> Self {
        Self {
            colour: Some(message.colour),
            structured: true,
            ..Self::output(message.message)
        }
    }

    pub fn error(error: ProcessError) -> Self {
        Self {
            content: error.to_string(),
            kind: OutputKind::Error,
            error: Some(error),
            ..Self::output("")
        }
    }

    pub fn completed(exit_code: Option<i32>) -> Self {
        let content = match exit_code {
            Some(code) => format!("process exited with code {}", code),
            None => "process terminated by signal".to_string(),
        };
        Self {
            kind: OutputKind::Completed,
            exit_code,
            ..Self::output(content)
        }
    }

    pub fn cancelled() -> Self {
        Self {
            kind: OutputKind::Cancelled,
            ..Self::output("process cancelled")
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.error, Some(ProcessError::Timeout(_)))
    }
}

/// Split one stdout line into output lines, expanding structured messages
pub fn classify_stdout(line: String) -> Vec<ProcessOutputLine> {
    match parse_structured(&line) {
        Some(messages) => messages
            .into_iter()
            .map(ProcessOutputLine::structured)
            .collect(),
        None => vec![ProcessOutputLine::output(line)],
    }
}

/// Observer of the OS process ids a command starts
pub trait ProcessTracker: Send + Sync {
    fn register(&self, pid: u32);
    fn unregister(&self, pid: u32);
}

/// Tracker keeping the set of live process ids
#[derive(Debug, Default)]
pub struct ProcessIdSet {
    pids: Mutex<HashSet<u32>>,
}

impl ProcessIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live process ids, sorted
    pub fn pids(&self) -> Vec<u32> {
        let pids = self.pids.lock().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<u32> = pids.iter().copied().collect();
        out.sort_unstable();
        out
    }
}

impl ProcessTracker for ProcessIdSet {
    fn register(&self, pid: u32) {
        self.pids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(pid);
    }

    fn unregister(&self, pid: u32) {
        self.pids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&pid);
    }
}

enum ProcessEvent {
    Stdout(String),
    Stderr(String),
    Exited {
        status: std::io::Result<ExitStatus>,
        timed_out: bool,
    },
}

/// An external command to run
#[derive(Clone)]
pub struct ProcessCommand {
    program: PathBuf,
    cwd: Option<PathBuf>,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    timeout: Duration,
    tracker: Option<Arc<dyn ProcessTracker>>,
    diagnostics: bool,
}

impl ProcessCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            cwd: None,
            args: Vec::new(),
            envs: Vec::new(),
            timeout: DEFAULT_STEP_TIMEOUT,
            tracker: None,
            diagnostics: false,
        }
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments from a whitespace-separated string; double quotes group
    pub fn arg_string(mut self, args: &str) -> Self {
        self.args.extend(split_args(args));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn envs<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.envs
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn tracker(mut self, tracker: Arc<dyn ProcessTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Start the command and stream its output
    ///
    /// The stream ends after a `Completed` line, after the timeout `Error`
    /// line, after a `Cancelled` line, or after a spawn failure `Error` line.
    /// Dropping the stream kills the process.
    pub fn execute(self, cancel: CancellationToken) -> BoxStream<'static, ProcessOutputLine> {
        Box::pin(async_stream::stream! {
            let program = self.program.display().to_string();
            let mut command = tokio::process::Command::new(&self.program);
            command
                .args(&self.args)
                .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);
            if let Some(cwd) = &self.cwd {
                command.current_dir(cwd);
            }

            let mut child = match command.spawn() {
                Ok(child) => child,
                Err(e) => {
                    if self.diagnostics {
                        tracing::debug!(%program, error = %e, "process spawn failed");
                    }
                    yield ProcessOutputLine::error(ProcessError::Spawn {
                        program,
                        message: e.to_string(),
                    });
                    return;
                }
            };

            let pid = child.id();
            if let (Some(tracker), Some(pid)) = (&self.tracker, pid) {
                tracker.register(pid);
            }
            if self.diagnostics {
                tracing::debug!(%program, pid, args = ?self.args, "process started");
            }

            let (tx, mut rx) = mpsc::unbounded_channel();
            let readers = [
                child.stdout.take().map(|out| spawn_reader(out, tx.clone(), ProcessEvent::Stdout)),
                child.stderr.take().map(|err| spawn_reader(err, tx.clone(), ProcessEvent::Stderr)),
            ];

            // Timer and caller cancellation both stop the process
            let timer = CancellationToken::new();
            let kill = cancel.child_token();
            let _kill_on_drop = kill.clone().drop_guard();
            {
                let timer = timer.clone();
                let kill = kill.clone();
                let timeout = self.timeout;
                tokio::spawn(async move {
                    tokio::select! {
                        _ = tokio::time::sleep(timeout) => {
                            timer.cancel();
                            kill.cancel();
                        }
                        _ = kill.cancelled() => {}
                    }
                });
            }

            {
                let kill = kill.clone();
                let timer = timer.clone();
                let tracker = self.tracker.clone();
                tokio::spawn(async move {
                    // Timed out only if the timer killed the child before it exited
                    let (status, timed_out) = tokio::select! {
                        status = child.wait() => (status, false),
                        _ = kill.cancelled() => {
                            let _ = child.start_kill();
                            (child.wait().await, timer.is_cancelled())
                        }
                    };
                    // Descendants can hold the pipes open after the child exits
                    let mut readers: Vec<_> = readers.into_iter().flatten().collect();
                    tokio::select! {
                        _ = futures::future::join_all(readers.iter_mut()) => {}
                        _ = kill.cancelled() => {}
                    }
                    for reader in &readers {
                        reader.abort();
                    }
                    if let (Some(tracker), Some(pid)) = (&tracker, pid) {
                        tracker.unregister(pid);
                    }
                    let _ = tx.send(ProcessEvent::Exited { status, timed_out });
                });
            }

            loop {
                // Only the caller's token ends the stream early
                let event = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    event = rx.recv() => Some(event),
                };

                match event {
                    None => {
                        if self.diagnostics {
                            tracing::debug!(%program, pid, "process cancelled");
                        }
                        yield ProcessOutputLine::cancelled();
                        break;
                    }
                    Some(None) => break,
                    Some(Some(ProcessEvent::Stdout(line))) => {
                        for output in classify_stdout(line) {
                            yield output;
                        }
                    }
                    Some(Some(ProcessEvent::Stderr(line))) => {
                        yield ProcessOutputLine::error(ProcessError::Stderr(line));
                    }
                    Some(Some(ProcessEvent::Exited { status, timed_out })) => {
                        if timed_out {
                            if self.diagnostics {
                                tracing::debug!(%program, pid, timeout_ms = self.timeout.as_millis() as u64, "process timed out");
                            }
                            yield ProcessOutputLine::error(ProcessError::Timeout(self.timeout));
                        } else {
                            match status {
                                Ok(status) => {
                                    if self.diagnostics {
                                        tracing::debug!(%program, pid, exit_code = ?status.code(), "process exited");
                                    }
                                    yield ProcessOutputLine::completed(status.code());
                                }
                                Err(e) => {
                                    yield ProcessOutputLine::error(ProcessError::Wait(e.to_string()));
                                }
                            }
                        }
                        break;
                    }
                }
            }
        })
    }
}

fn spawn_reader<R>(
    source: R,
    tx: mpsc::UnboundedSender<ProcessEvent>,
    wrap: fn(String) -> ProcessEvent,
) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(wrap(decode_line(&buf))).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read process output");
                    break;
                }
            }
        }
    })
}

/// One output line without its terminator; invalid UTF-8 is replaced
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
