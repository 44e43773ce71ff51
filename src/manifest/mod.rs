//! Requirement manifest reading.
//!
//! A manifest is a `requirements.txt`-style file: one requirement
//! specifier per line, `#` comments and blank lines ignored.
//!
//! # Modules
//!
//! - [`reader`] - Line handling, strict and lenient parsing, file reading
//! - [`specifier`] - A single requirement specifier
//! - [`version`] - Versions and version constraints
//!
//! # Example
//!
//! ```
//! use localdeps::manifest::parse;
//!
//! let specs = parse("# add-on deps\nsix>=1.10,<2.0\n").unwrap();
//! assert_eq!(specs.len(), 1);
//! assert_eq!(specs[0].name, "six");
//! assert_eq!(specs[0].version_constraint.as_deref(), Some(">=1.10,<2.0"));
//! ```

pub mod reader;
pub mod specifier;
pub mod version;

pub use reader::{parse, parse_lenient, ManifestReader};
pub use specifier::{normalize_name, RequirementSpec};
pub use version::{Version, VersionConstraint};
