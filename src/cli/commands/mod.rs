//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads the
//! plugin's configuration once into a [`ProjectContext`] and routes the
//! subcommand to its implementation. Every command builds its own
//! [`Addon`](crate::addon::Addon), so each invocation starts with an empty
//! install-state cache.
//!
//! Exit codes: 0 on success, 1 when dependencies are not installed (or an
//! install or import failed), 2 when the manifest cannot be read.

pub mod check;
pub mod context;
pub mod dispatcher;
pub mod exercise;
pub mod install;
pub mod list;
pub mod panel;

pub use context::ProjectContext;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
