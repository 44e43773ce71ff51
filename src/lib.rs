//! localdeps - Private Python dependencies for host-application plugins.
//!
//! A plugin ships a `requirements.txt` and wants its third-party packages
//! installed into a directory it owns, beside its code, instead of the host
//! application's interpreter. localdeps checks whether every requirement
//! resolves from that directory, installs the manifest into it on demand and
//! gates the plugin's commands on the result.
//!
//! # Modules
//!
//! - [`addon`] - Command gating, the install action and panel rendering
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`manifest`] - Requirements manifest parsing and version constraints
//! - [`requirements`] - Dependency checking, resolution and installation
//! - [`shell`] - Subprocess execution
//! - [`ui`] - Prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use localdeps::requirements::{DependencyChecker, DepsLayout, DistInfoResolver, PipInstaller};
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("requirements.txt"), "six>=1.10,<2.0\n").unwrap();
//!
//! let mut checker = DependencyChecker::new(
//!     DepsLayout::beside(temp.path()),
//!     DistInfoResolver::new(),
//!     PipInstaller::new("python3"),
//! );
//! assert_eq!(checker.requirement_names(false).unwrap(), ["six"]);
//! assert!(!checker.is_satisfied(true));
//! ```

pub mod addon;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod requirements;
pub mod shell;
pub mod ui;

pub use error::{LocaldepsError, Result};
