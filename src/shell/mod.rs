//! Subprocess execution and platform detection.

pub mod command;
pub mod platform;

pub use command::{
    display_command, run, run_check, run_streaming, CommandOptions, CommandResult,
    OutputCallback, OutputLine,
};
pub use platform::{default_python, is_ci};
