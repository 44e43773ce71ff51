//! Subprocess execution.
//!
//! Programs are launched directly (no intermediate shell) so that paths
//! with spaces reach the installer unmangled.

use crate::error::{LocaldepsError, Result};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timed out).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed for exceeding its timeout.
    pub timed_out: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
            timed_out: false,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
            timed_out: false,
        }
    }

    /// The last non-empty lines of stderr (or stdout if stderr is empty),
    /// for short diagnostics.
    pub fn output_tail(&self, lines: usize) -> String {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let kept: Vec<&str> = source
            .lines()
            .filter(|l| !l.trim().is_empty())
            .collect();
        let start = kept.len().saturating_sub(lines);
        kept[start..].join("\n")
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, OsString>,

    /// Timeout in seconds (None = no timeout).
    pub timeout: Option<u64>,
}

/// Output line from command execution.
#[derive(Debug, Clone)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Callback for streaming output.
pub type OutputCallback = Box<dyn Fn(OutputLine) + Send>;

/// Render a program and its arguments for log messages.
pub fn display_command<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> String {
    let mut parts = vec![program.to_string_lossy().into_owned()];
    parts.extend(args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()));
    parts.join(" ")
}

fn build_command<S: AsRef<OsStr>>(program: &OsStr, args: &[S], options: &CommandOptions) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd
}

/// Run a program to completion, capturing its output.
///
/// Launch failure is an error; a non-zero exit is a failed
/// [`CommandResult`].
pub fn run<S: AsRef<OsStr>>(
    program: &OsStr,
    args: &[S],
    options: &CommandOptions,
) -> Result<CommandResult> {
    run_inner(program, args, options, None)
}

/// Run a program, passing each output line to `callback` as it arrives.
pub fn run_streaming<S: AsRef<OsStr>>(
    program: &OsStr,
    args: &[S],
    options: &CommandOptions,
    callback: OutputCallback,
) -> Result<CommandResult> {
    run_inner(program, args, options, Some(callback))
}

/// Run a program and return whether it exited 0.
pub fn run_check<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> bool {
    run(program, args, &CommandOptions::default())
        .map(|r| r.success)
        .unwrap_or(false)
}

fn run_inner<S: AsRef<OsStr>>(
    program: &OsStr,
    args: &[S],
    options: &CommandOptions,
    callback: Option<OutputCallback>,
) -> Result<CommandResult> {
    let start = Instant::now();
    let rendered = display_command(program, args);
    tracing::debug!("Running: {}", rendered);

    let mut child = build_command(program, args, options)
        .spawn()
        .map_err(|e| {
            tracing::debug!("Failed to launch '{}': {}", rendered, e);
            LocaldepsError::CommandFailed {
                command: rendered.clone(),
                code: None,
            }
        })?;

    let (tx, rx) = mpsc::channel();
    let stdout_handle = child
        .stdout
        .take()
        .map(|out| spawn_reader(out, tx.clone(), OutputLine::Stdout));
    let stderr_handle = child
        .stderr
        .take()
        .map(|err| spawn_reader(err, tx, OutputLine::Stderr));

    let mut stdout = String::new();
    let mut stderr = String::new();
    let mut sink = |line: OutputLine| {
        match &line {
            OutputLine::Stdout(l) => {
                stdout.push_str(l);
                stdout.push('\n');
            }
            OutputLine::Stderr(l) => {
                stderr.push_str(l);
                stderr.push('\n');
            }
        }
        if let Some(cb) = &callback {
            cb(line);
        }
    };

    let timeout = options.timeout.map(Duration::from_secs);
    let status = wait_with_timeout(&mut child, timeout, &rx, &mut sink).map_err(|_| {
        LocaldepsError::CommandFailed {
            command: rendered.clone(),
            code: None,
        }
    })?;

    // A killed child may leave grandchildren holding the pipes open, so
    // only wait for the readers after a normal exit.
    if status.is_some() {
        for handle in [stdout_handle, stderr_handle].into_iter().flatten() {
            handle.join().ok();
        }
    }
    for line in rx.try_iter() {
        sink(line);
    }
    let duration = start.elapsed();

    match status {
        Some(status) if status.success() => Ok(CommandResult::success(stdout, stderr, duration)),
        Some(status) => Ok(CommandResult::failure(
            status.code(),
            stdout,
            stderr,
            duration,
        )),
        None => {
            tracing::warn!("'{}' timed out after {:?}", rendered, timeout);
            let mut result = CommandResult::failure(None, stdout, stderr, duration);
            result.timed_out = true;
            Ok(result)
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    source: R,
    tx: mpsc::Sender<OutputLine>,
    wrap: fn(String) -> OutputLine,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            // Installers may print bytes that are not UTF-8.
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']).to_string();
            if tx.send(wrap(line)).is_err() {
                break;
            }
        }
    })
}

/// Wait for `child`, forwarding output lines to `sink`, killing it past
/// `timeout`.
///
/// Returns `None` when the child was killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
    rx: &mpsc::Receiver<OutputLine>,
    sink: &mut dyn FnMut(OutputLine),
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let start = Instant::now();
    let poll = Duration::from_millis(50);

    loop {
        match rx.recv_timeout(poll) {
            Ok(line) => sink(line),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            // Both pipes closed; keep polling the child without spinning.
            Err(mpsc::RecvTimeoutError::Disconnected) => thread::sleep(poll),
        }

        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        if let Some(limit) = timeout {
            if start.elapsed() >= limit {
                child.kill().ok();
                child.wait().ok();
                return Ok(None);
            }
        }
    }
}
