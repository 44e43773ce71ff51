//! Import test through the interpreter.
//!
//! Proves an install is usable: the interpreter is launched with the
//! private directory on its search path and asked to import a module.

use regex::Regex;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{LocaldepsError, Result};
use crate::requirements::{SearchPath, SEARCH_PATH_VAR};
use crate::shell::{self, CommandOptions};

static MODULE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("module regex is valid")
});

/// Seconds an import test may take.
const EXERCISE_TIMEOUT_SECS: u64 = 60;

/// Outcome of an import test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseReport {
    pub module: String,
    pub imported: bool,
    /// Where the module was loaded from, when the import worked.
    pub location: Option<String>,
    /// Last lines of interpreter output, when it did not.
    pub diagnostics: Option<String>,
}

/// Try to import `module` with `search_path` appended to the inherited
/// search path of a child interpreter.
pub fn exercise(python: &Path, search_path: &SearchPath, module: &str) -> Result<ExerciseReport> {
    if !MODULE_REGEX.is_match(module) {
        return Err(LocaldepsError::ConfigValidationError {
            message: format!("'{}' is not a valid module name", module),
        });
    }

    let code = format!(
        "import {m}\nprint(getattr({m}, '__file__', None) or '<built-in>')",
        m = module
    );
    let mut env = HashMap::new();
    env.insert(
        SEARCH_PATH_VAR.to_string(),
        search_path.to_env_value(std::env::var_os(SEARCH_PATH_VAR)),
    );
    let options = CommandOptions {
        env,
        timeout: Some(EXERCISE_TIMEOUT_SECS),
        ..Default::default()
    };

    let args = [OsString::from("-c"), OsString::from(code)];
    let result = shell::run(python.as_os_str(), &args, &options)?;
    tracing::debug!(
        "Import of {} exited with {:?} in {:?}",
        module,
        result.exit_code,
        result.duration
    );

    if result.success {
        let location = result
            .stdout
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string());
        Ok(ExerciseReport {
            module: module.to_string(),
            imported: true,
            location,
            diagnostics: None,
        })
    } else {
        Ok(ExerciseReport {
            module: module.to_string(),
            imported: false,
            location: None,
            diagnostics: Some(if result.timed_out {
                "timed out".to_string()
            } else {
                result.output_tail(5)
            }),
        })
    }
}
