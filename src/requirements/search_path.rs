//! The module search path handed to the interpreter.
//!
//! Packages installed into the private directory are only importable once
//! that directory is on the interpreter's search path. The path is passed
//! to child interpreters through `PYTHONPATH`; the current process
//! environment is never modified.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable carrying the search path.
pub const SEARCH_PATH_VAR: &str = "PYTHONPATH";

/// Ordered, duplicate-free list of extra module directories.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    entries: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `dir` unless it is already present.
    ///
    /// Returns `true` when the directory was added.
    pub fn register(&mut self, dir: &Path) -> bool {
        if self.contains(dir) {
            tracing::trace!("{} already on search path", dir.display());
            return false;
        }
        tracing::debug!("Adding {} to search path", dir.display());
        self.entries.push(dir.to_path_buf());
        true
    }

    /// Whether `dir` is registered.
    pub fn contains(&self, dir: &Path) -> bool {
        self.entries.iter().any(|e| e == dir)
    }

    /// Registered directories, in order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Value for [`SEARCH_PATH_VAR`]: registered entries appended after
    /// whatever `inherited` already holds.
    pub fn to_env_value(&self, inherited: Option<OsString>) -> OsString {
        let mut all: Vec<PathBuf> = inherited
            .map(|v| {
                std::env::split_paths(&v)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        for entry in &self.entries {
            if !all.contains(entry) {
                all.push(entry.clone());
            }
        }
        // join_paths only fails on entries containing the separator.
        std::env::join_paths(&all).unwrap_or_else(|_| {
            self.entries
                .first()
                .map(|p| p.as_os_str().to_os_string())
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        let mut path = SearchPath::new();
        assert!(path.register(Path::new("/addon/deps_public")));
        assert!(!path.register(Path::new("/addon/deps_public")));
        assert_eq!(path.entries().len(), 1);
    }

    #[test]
    fn preserves_registration_order() {
        let mut path = SearchPath::new();
        path.register(Path::new("/b"));
        path.register(Path::new("/a"));
        assert_eq!(path.entries(), &[PathBuf::from("/b"), PathBuf::from("/a")]);
    }

    #[cfg(unix)]
    #[test]
    fn env_value_appends_after_inherited() {
        let mut path = SearchPath::new();
        path.register(Path::new("/addon/deps_public"));

        let value = path.to_env_value(Some(OsString::from("/usr/lib/extra")));
        assert_eq!(value, OsString::from("/usr/lib/extra:/addon/deps_public"));
    }

    #[cfg(unix)]
    #[test]
    fn env_value_skips_inherited_duplicate() {
        let mut path = SearchPath::new();
        path.register(Path::new("/addon/deps_public"));

        let value = path.to_env_value(Some(OsString::from("/addon/deps_public")));
        assert_eq!(value, OsString::from("/addon/deps_public"));
    }

    #[test]
    fn env_value_without_inherited() {
        let mut path = SearchPath::new();
        path.register(Path::new("/x"));
        assert_eq!(path.to_env_value(None), OsString::from("/x"));
    }
}
