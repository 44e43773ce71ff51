//! Error types for localdeps operations.
//!
//! This module defines [`LocaldepsError`], the error type used by the
//! configuration and CLI layers, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Manifest problems surface as [`ManifestError`], the only error the
//!   dependency checker lets cross its public boundary
//! - Install and resolution failures are typed ([`InstallError`],
//!   [`ResolutionError`]) but the checker logs them and reports `false`
//! - Use `anyhow::Error` (via `LocaldepsError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for localdeps operations.
#[derive(Debug, Error)]
pub enum LocaldepsError {
    /// An explicitly requested configuration file does not exist.
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The requirements manifest could not be read or parsed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Shell command failed to launch.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised while reading a requirements manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A line matched no requirement specifier grammar.
    #[error("Invalid requirement on line {line} ('{content}'): {reason}")]
    Parse {
        line: usize,
        content: String,
        reason: String,
    },

    /// The manifest file could not be read.
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the install sequence.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The private install directory could not be created.
    #[error("Failed to create dependency directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The installer tool could not be bootstrapped.
    #[error("Failed to bootstrap package installer: {message}")]
    ToolBootstrap { message: String },

    /// The installer subprocess failed to launch or exited non-zero.
    #[error("Package install failed with exit code {code:?}: {message}")]
    SubprocessInstall { code: Option<i32>, message: String },
}

/// Failure to resolve one requirement from the private directory.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// No distribution with that name is installed.
    #[error("'{name}' is not installed in {dir}")]
    NotFound { name: String, dir: PathBuf },

    /// A distribution is installed but its version does not match.
    #[error("'{name}' {found} does not satisfy '{constraint}'")]
    VersionMismatch {
        name: String,
        found: String,
        constraint: String,
    },

    /// The distribution is installed but something it requires is not.
    #[error("'{name}' needs '{dependency}' (required by {required_by}): {reason}")]
    DependencyUnmet {
        name: String,
        dependency: String,
        required_by: String,
        reason: String,
    },

    /// Installed metadata is missing or corrupt.
    #[error("Corrupt metadata at {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Filesystem error while scanning.
    #[error("Failed to scan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for localdeps operations.
pub type Result<T> = std::result::Result<T, LocaldepsError>;
