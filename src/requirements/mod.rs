//! Plugin dependency checking and installation.
//!
//! A plugin ships a requirements manifest and installs its packages into a
//! private directory beside its code. This module answers whether those
//! packages are present, and installs them when they are not.
//!
//! # Modules
//!
//! - [`checker`] - The cached [`DependencyChecker`] and its [`DepsLayout`]
//! - [`installer`] - External installer invocation
//! - [`resolver`] - Resolving requirements against installed metadata
//! - [`search_path`] - Module search path handed to child interpreters
//! - [`status`] - Install state and per-requirement status types

pub mod checker;
pub mod installer;
pub mod resolver;
pub mod search_path;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use checker::{DependencyChecker, DepsLayout, DEFAULT_DEPS_DIR, DEFAULT_MANIFEST};
pub use installer::{OutputListener, PackageInstaller, PipInstaller};
pub use resolver::{DistInfoResolver, ResolvedDistribution, Resolver};
pub use search_path::{SearchPath, SEARCH_PATH_VAR};
pub use status::{GapResult, InstallRecord, InstallState, RequirementStatus};
