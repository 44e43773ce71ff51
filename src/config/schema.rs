//! Configuration schema definitions.
//!
//! Maps `.localdeps/config.yml` (and its `config.local.yml` override) onto
//! typed structs. Every key is optional; [`LocaldepsConfig::resolve`] fills
//! in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LocaldepsError, Result};
use crate::requirements::{DepsLayout, DEFAULT_DEPS_DIR, DEFAULT_MANIFEST};
use crate::shell::default_python;

/// Environment variable overriding the interpreter.
pub const PYTHON_ENV_VAR: &str = "LOCALDEPS_PYTHON";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaldepsConfig {
    /// Requirements manifest, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Private install directory, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deps_dir: Option<PathBuf>,

    /// Interpreter used to run the installer and import tests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<PathBuf>,

    /// Kill the installer after this many seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_timeout_secs: Option<u64>,

    /// Extra arguments appended to the install command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_install_args: Vec<String>,

    /// Default output verbosity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_output: Option<OutputMode>,
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Verbose,
    #[default]
    Normal,
    Quiet,
    Silent,
}

/// Arguments that would send packages somewhere other than the private
/// directory.
const FORBIDDEN_INSTALL_ARGS: &[&str] = &["--target", "-t", "--user", "--prefix", "--root"];

/// Configuration with defaults applied and paths made absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub layout: DepsLayout,
    pub python: PathBuf,
    pub install_timeout_secs: Option<u64>,
    pub extra_install_args: Vec<String>,
    pub default_output: OutputMode,
}

impl LocaldepsConfig {
    /// Apply environment overrides, looking variables up through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(python) = lookup(PYTHON_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Using interpreter from {}: {}", PYTHON_ENV_VAR, python);
            self.python = Some(PathBuf::from(python));
        }
    }

    /// Check values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.install_timeout_secs == Some(0) {
            return Err(invalid("install_timeout_secs must be greater than zero"));
        }
        if self
            .python
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(invalid("python must not be empty"));
        }
        for arg in &self.extra_install_args {
            let flag = arg.split('=').next().unwrap_or(arg);
            if FORBIDDEN_INSTALL_ARGS.contains(&flag) {
                return Err(invalid(&format!(
                    "extra_install_args may not contain '{}': packages must go to deps_dir",
                    flag
                )));
            }
        }
        if let (Some(manifest), Some(deps_dir)) = (&self.manifest, &self.deps_dir) {
            if manifest == deps_dir {
                return Err(invalid("manifest and deps_dir must be different paths"));
            }
        }
        Ok(())
    }

    /// Fill in defaults and resolve relative paths against `project_root`.
    pub fn resolve(&self, project_root: &Path) -> ResolvedConfig {
        let manifest = self
            .manifest
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));
        let deps_dir = self
            .deps_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DEPS_DIR));

        ResolvedConfig {
            layout: DepsLayout::new(project_root.join(manifest), project_root.join(deps_dir)),
            python: self
                .python
                .clone()
                .unwrap_or_else(|| PathBuf::from(default_python())),
            install_timeout_secs: self.install_timeout_secs,
            extra_install_args: self.extra_install_args.clone(),
            default_output: self.default_output.unwrap_or_default(),
        }
    }
}

fn invalid(message: &str) -> LocaldepsError {
    LocaldepsError::ConfigValidationError {
        message: message.to_string(),
    }
}
