//! Install state and per-requirement status types.
//!
//! The checker keeps one [`InstallRecord`] describing the last aggregate
//! check; diagnostic reports produce a [`GapResult`] per requirement.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Cached outcome of the last satisfaction check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallState {
    /// Not checked since start-up or since the last invalidation.
    #[default]
    Unknown,
    /// Every requirement resolved from the private directory.
    Satisfied,
    /// At least one requirement did not resolve, or the check failed.
    Unsatisfied,
}

impl InstallState {
    /// The cached boolean, if a check has happened.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Satisfied => Some(true),
            Self::Unsatisfied => Some(false),
        }
    }

    /// Label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Satisfied => "satisfied",
            Self::Unsatisfied => "unsatisfied",
        }
    }
}

impl From<bool> for InstallState {
    fn from(satisfied: bool) -> Self {
        if satisfied {
            Self::Satisfied
        } else {
            Self::Unsatisfied
        }
    }
}

/// The install state together with where and when it was determined.
#[derive(Debug, Clone, Serialize)]
pub struct InstallRecord {
    /// Cached state.
    pub state: InstallState,
    /// Directory the state was checked against.
    pub checked_against: PathBuf,
    /// When the state was last set; `None` while `Unknown`.
    pub checked_at: Option<DateTime<Utc>>,
}

impl InstallRecord {
    /// A fresh, unchecked record for `dir`.
    pub fn unknown(dir: &Path) -> Self {
        Self {
            state: InstallState::Unknown,
            checked_against: dir.to_path_buf(),
            checked_at: None,
        }
    }

    /// Record the outcome of a check.
    pub fn set(&mut self, satisfied: bool) {
        self.state = satisfied.into();
        self.checked_at = Some(Utc::now());
    }

    /// Forget the cached outcome.
    pub fn reset(&mut self) {
        self.state = InstallState::Unknown;
        self.checked_at = None;
    }
}

/// The result of checking a single requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequirementStatus {
    /// Installed with an acceptable version.
    Satisfied { version: String },

    /// No distribution of that name in the private directory.
    Missing,

    /// Installed, but the version does not satisfy the constraint.
    VersionMismatch { found: String, constraint: String },

    /// The check itself failed (corrupt metadata, permissions).
    Error { message: String },
}

impl RequirementStatus {
    /// Whether this requirement is met.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }

    /// Short label for display.
    pub fn label(&self) -> String {
        match self {
            Self::Satisfied { version } => format!("installed ({})", version),
            Self::Missing => "missing".to_string(),
            Self::VersionMismatch { found, constraint } => {
                format!("{} installed, needs {}", found, constraint)
            }
            Self::Error { message } => format!("error: {}", message),
        }
    }
}

/// A requirement paired with its status.
#[derive(Debug, Clone, Serialize)]
pub struct GapResult {
    /// The requirement as written (normalized spacing).
    pub requirement: String,
    /// Its status.
    #[serde(flatten)]
    pub status: RequirementStatus,
}
