//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions and defaults in [`schema`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use localdeps::config::load_config;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::create_dir_all(temp.path().join(".localdeps")).unwrap();
//! fs::write(temp.path().join(".localdeps/config.yml"), "deps_dir: vendor").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! let resolved = config.resolve(temp.path());
//! assert_eq!(resolved.layout.deps_dir, temp.path().join("vendor"));
//! ```
//!
//! # Configuration File Locations
//!
//! 1. Project config (`.localdeps/config.yml`)
//! 2. Local overrides (`.localdeps/config.local.yml`)
//! 3. `LOCALDEPS_PYTHON` environment variable for the interpreter

pub mod loader;
pub mod schema;

pub use loader::{
    find_project_root, load_config, load_merged_config, parse_config, ConfigPaths, CONFIG_DIR,
};
pub use schema::{LocaldepsConfig, OutputMode, ResolvedConfig, PYTHON_ENV_VAR};
