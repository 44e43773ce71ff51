//! Package installer invocation.
//!
//! The installer is an external process. [`PipInstaller`] drives the
//! interpreter's own `pip`, always with `--target` so nothing lands in the
//! interpreter's shared environment.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::InstallError;
use crate::shell::{self, CommandOptions, CommandResult, OutputLine};

/// Number of output lines kept in error messages.
const DIAGNOSTIC_LINES: usize = 10;

/// The external installer the checker shells out to.
pub trait PackageInstaller {
    /// Make sure the installer tool itself is present and current.
    fn ensure_latest(&self) -> Result<(), InstallError>;

    /// Install exactly the requirements in `manifest` into `target`.
    fn install(&self, manifest: &Path, target: &Path) -> Result<(), InstallError>;
}

/// Installs with `<python> -m pip install -r <manifest> --target <dir>`.
pub struct PipInstaller {
    python: PathBuf,
    extra_args: Vec<String>,
    timeout: Option<u64>,
    on_output: Option<OutputListener>,
}

/// Receives installer output lines as they are produced.
pub type OutputListener = Arc<dyn Fn(&str) + Send + Sync>;

impl PipInstaller {
    /// Create an installer for the given interpreter.
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            extra_args: Vec::new(),
            timeout: None,
            on_output: None,
        }
    }

    /// Extra arguments appended to `pip install` (e.g. `--no-cache-dir`).
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Kill the installer after `secs` seconds.
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout = secs;
        self
    }

    /// Receive installer output lines as they are produced.
    pub fn with_output_listener(mut self, listener: OutputListener) -> Self {
        self.on_output = Some(listener);
        self
    }

    /// Replace or clear the output listener.
    pub fn set_output_listener(&mut self, listener: Option<OutputListener>) {
        self.on_output = listener;
    }

    /// The interpreter this installer runs.
    pub fn python(&self) -> &Path {
        &self.python
    }

    /// Arguments for the bootstrap call.
    pub fn bootstrap_args() -> Vec<OsString> {
        ["-m", "ensurepip", "--upgrade"]
            .into_iter()
            .map(OsString::from)
            .collect()
    }

    /// Arguments for the install call.
    pub fn install_args(&self, manifest: &Path, target: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-m", "pip", "install", "-r"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(manifest.as_os_str().to_os_string());
        args.push(OsString::from("--target"));
        args.push(target.as_os_str().to_os_string());
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    fn options(&self) -> CommandOptions {
        CommandOptions {
            timeout: self.timeout,
            ..Default::default()
        }
    }

    fn execute(&self, args: &[OsString]) -> crate::error::Result<CommandResult> {
        let program: &OsStr = self.python.as_os_str();
        match &self.on_output {
            Some(listener) => {
                let listener = Arc::clone(listener);
                let callback = Box::new(move |line: OutputLine| match line {
                    OutputLine::Stdout(l) | OutputLine::Stderr(l) => listener(&l),
                });
                shell::run_streaming(program, args, &self.options(), callback)
            }
            None => shell::run(program, args, &self.options()),
        }
    }
}

impl PackageInstaller for PipInstaller {
    fn ensure_latest(&self) -> Result<(), InstallError> {
        let args = Self::bootstrap_args();
        tracing::info!("Ensuring pip is available for {}", self.python.display());

        let result = self
            .execute(&args)
            .map_err(|e| InstallError::ToolBootstrap {
                message: e.to_string(),
            })?;

        if result.success {
            Ok(())
        } else {
            tracing::warn!(
                "ensurepip exited with {:?}:\n{}",
                result.exit_code,
                result.stderr
            );
            Err(InstallError::ToolBootstrap {
                message: failure_message(&result),
            })
        }
    }

    fn install(&self, manifest: &Path, target: &Path) -> Result<(), InstallError> {
        let args = self.install_args(manifest, target);
        tracing::info!(
            "Installing requirements from {} into {}",
            manifest.display(),
            target.display()
        );

        let result = self
            .execute(&args)
            .map_err(|e| InstallError::SubprocessInstall {
                code: None,
                message: e.to_string(),
            })?;

        if result.success {
            tracing::debug!("pip install output:\n{}", result.stdout);
            Ok(())
        } else {
            tracing::warn!(
                "pip install exited with {:?}:\n{}",
                result.exit_code,
                result.stderr
            );
            Err(InstallError::SubprocessInstall {
                code: result.exit_code,
                message: failure_message(&result),
            })
        }
    }
}

fn failure_message(result: &CommandResult) -> String {
    if result.timed_out {
        return "timed out".to_string();
    }
    let tail = result.output_tail(DIAGNOSTIC_LINES);
    if tail.is_empty() {
        "no output".to_string()
    } else {
        tail
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Write an executable script standing in for the interpreter.
    fn fake_python(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("python");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn install_args_use_target_directory() {
        let installer = PipInstaller::new("python3").with_extra_args(vec!["--no-cache-dir".into()]);
        let args = installer.install_args(Path::new("/a/requirements.txt"), Path::new("/a/deps"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-m",
                "pip",
                "install",
                "-r",
                "/a/requirements.txt",
                "--target",
                "/a/deps",
                "--no-cache-dir"
            ]
        );
    }

    #[test]
    fn bootstrap_runs_ensurepip() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("calls.log");
        let python = fake_python(temp.path(), &format!("echo \"$@\" >> {}", log.display()));

        PipInstaller::new(&python).ensure_latest().unwrap();

        let calls = fs::read_to_string(log).unwrap();
        assert_eq!(calls.trim(), "-m ensurepip --upgrade");
    }

    #[test]
    fn bootstrap_failure_is_tool_error() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path(), "echo 'No module named ensurepip' >&2; exit 1");

        let err = PipInstaller::new(&python).ensure_latest().unwrap_err();
        match err {
            InstallError::ToolBootstrap { message } => {
                assert!(message.contains("No module named ensurepip"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_interpreter_is_tool_error() {
        let temp = TempDir::new().unwrap();
        let err = PipInstaller::new(temp.path().join("no-python"))
            .ensure_latest()
            .unwrap_err();
        assert!(matches!(err, InstallError::ToolBootstrap { .. }));
    }

    #[test]
    fn nonzero_install_exit_is_subprocess_error() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(
            temp.path(),
            "echo 'ERROR: No matching distribution found for six' >&2; exit 1",
        );

        let err = PipInstaller::new(&python)
            .install(Path::new("requirements.txt"), temp.path())
            .unwrap_err();
        match err {
            InstallError::SubprocessInstall { code, message } => {
                assert_eq!(code, Some(1));
                assert!(message.contains("No matching distribution"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn install_timeout_is_subprocess_error() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path(), "sleep 5");

        let err = PipInstaller::new(&python)
            .with_timeout(Some(1))
            .install(Path::new("requirements.txt"), temp.path())
            .unwrap_err();
        match err {
            InstallError::SubprocessInstall { code, message } => {
                assert_eq!(code, None);
                assert_eq!(message, "timed out");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn output_listener_receives_lines() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path(), "echo Collecting six; echo Installing");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        PipInstaller::new(&python)
            .with_output_listener(Arc::new(move |line: &str| {
                sink.lock().unwrap().push(line.to_string())
            }))
            .install(Path::new("requirements.txt"), temp.path())
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec!["Collecting six", "Installing"]);
    }
}
