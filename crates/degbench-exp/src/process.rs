//! Blocking invocation of the external analysis tool.
//!
//! [`ToolRunner`] is the seam between the orchestrator and the operating
//! system; [`ProcessRunner`] is the real implementation. Each invocation
//! returns an [`InvocationResult`] carrying exit code, duration and status, and
//! a non-success result is turned into a [`DegError::Process`] by the caller.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use degbench_core::errors::{DegError, ErrorInfo};
use degbench_core::ToolConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A fully rendered tool command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Destination for stdout and stderr; discarded when `None`.
    pub log_path: Option<PathBuf>,
}

impl Invocation {
    /// `<program> -a <alphabet_type> -i <input> -o <output>`
    pub fn for_bucket(
        tool: &ToolConfig,
        input: &Path,
        output: &Path,
        log_path: Option<PathBuf>,
    ) -> Self {
        Self {
            program: tool.program.clone(),
            args: vec![
                "-a".to_string(),
                tool.alphabet_type.clone(),
                "-i".to_string(),
                input.display().to_string(),
                "-o".to_string(),
                output.display().to_string(),
            ],
            log_path,
        }
    }

    /// Human readable command line, for logs and manifests.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Terminal state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvocationStatus {
    Succeeded,
    /// Exited with a non-zero code or was killed by a signal.
    Failed,
    /// Killed after exceeding the configured timeout.
    TimedOut,
}

/// Structured outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub command: String,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    pub status: InvocationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        self.status == InvocationStatus::Succeeded
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Passes successful results through and converts anything else into a
    /// `Process` error.
    pub fn ensure_success(self) -> Result<Self, DegError> {
        let (code, message) = match self.status {
            InvocationStatus::Succeeded => return Ok(self),
            InvocationStatus::Failed => ("tool-failed", "external tool exited unsuccessfully"),
            InvocationStatus::TimedOut => ("tool-timed-out", "external tool exceeded its time limit"),
        };
        let mut info = ErrorInfo::new(code, message)
            .with_context("command", &self.command)
            .with_context("duration_ms", self.duration_ms);
        if let Some(exit_code) = self.exit_code {
            info = info.with_context("exit_code", exit_code);
        }
        if let Some(log) = &self.log_path {
            info = info.with_hint(format!("see tool output in {}", log.display()));
        }
        Err(DegError::Process(info))
    }
}

/// Executes invocations one at a time, blocking until each terminates.
pub trait ToolRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<InvocationResult, DegError>;
}

/// Runs the tool as a child process (no shell) with an optional wall-clock
/// limit.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    poll_interval: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn from_config(tool: &ToolConfig) -> Self {
        Self::new(tool.timeout())
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Waits for the child, killing it once the timeout elapses.
    /// `None` means the child was killed.
    fn wait(&self, child: &mut Child, started: Instant) -> Result<Option<ExitStatus>, DegError> {
        let Some(limit) = self.timeout else {
            return child.wait().map(Some).map_err(wait_error);
        };
        loop {
            if let Some(status) = child.try_wait().map_err(wait_error)? {
                return Ok(Some(status));
            }
            let elapsed = started.elapsed();
            if elapsed >= limit {
                // The child may exit between try_wait and kill; reaping below
                // handles both cases.
                let _ = child.kill();
                child.wait().map_err(wait_error)?;
                return Ok(None);
            }
            thread::sleep(self.poll_interval.min(limit - elapsed));
        }
    }
}

fn wait_error(err: std::io::Error) -> DegError {
    DegError::Process(ErrorInfo::new("wait-failed", err.to_string()))
}

fn log_stdio(path: &Path) -> Result<(Stdio, Stdio), DegError> {
    let out = File::create(path).map_err(|err| DegError::io("tool-log-create", path, err))?;
    let err_out = out
        .try_clone()
        .map_err(|err| DegError::io("tool-log-create", path, err))?;
    Ok((Stdio::from(out), Stdio::from(err_out)))
}

impl ToolRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<InvocationResult, DegError> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stdin(Stdio::null());
        match &invocation.log_path {
            Some(path) => {
                let (out, err_out) = log_stdio(path)?;
                command.stdout(out).stderr(err_out);
            }
            None => {
                command.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }

        let started = Instant::now();
        let mut child = command.spawn().map_err(|err| {
            DegError::Process(
                ErrorInfo::new("spawn-failed", err.to_string())
                    .with_context("program", invocation.program.display())
                    .with_hint("check tool.program points at an executable"),
            )
        })?;
        debug!(pid = child.id(), "tool spawned");
        let exit = self.wait(&mut child, started)?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (exit_code, status) = match exit {
            Some(exit) if exit.success() => (exit.code(), InvocationStatus::Succeeded),
            Some(exit) => (exit.code(), InvocationStatus::Failed),
            None => {
                warn!(
                    command = %invocation.command_line(),
                    timeout = ?self.timeout,
                    "tool killed after timeout"
                );
                (None, InvocationStatus::TimedOut)
            }
        };
        Ok(InvocationResult {
            command: invocation.command_line(),
            exit_code,
            duration_ms,
            status,
            log_path: invocation.log_path.clone(),
        })
    }
}
