//! Per-invocation project context.

use std::path::{Path, PathBuf};

use crate::addon::{Addon, AddonCommands};
use crate::config::{load_config, ResolvedConfig};
use crate::error::Result;
use crate::requirements::{DependencyChecker, DistInfoResolver, PipInstaller};

/// Commands that work without third-party packages.
pub const PREFERENCE_COMMANDS: &[&str] = &["install", "panel"];

/// Commands that need the requirements installed.
pub const GATED_COMMANDS: &[&str] = &["exercise"];

/// A plugin root together with its resolved configuration.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    root: PathBuf,
    config: ResolvedConfig,
}

impl ProjectContext {
    /// Load configuration for the plugin rooted at `root`.
    pub fn load(root: &Path, config_override: Option<&Path>) -> Result<Self> {
        let config = load_config(root, config_override)?;
        Ok(Self::new(root, config.resolve(root)))
    }

    pub fn new(root: &Path, config: ResolvedConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Plugin name: the root directory's name.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "plugin".to_string())
    }

    /// Build a fresh addon with an empty cache.
    pub fn addon(&self) -> Addon<DistInfoResolver, PipInstaller> {
        let installer = PipInstaller::new(self.config.python.clone())
            .with_extra_args(self.config.extra_install_args.clone())
            .with_timeout(self.config.install_timeout_secs);
        let checker = DependencyChecker::new(
            self.config.layout.clone(),
            DistInfoResolver::new(),
            installer,
        );
        Addon::new(
            self.name(),
            checker,
            AddonCommands::new(
                PREFERENCE_COMMANDS.iter().copied(),
                GATED_COMMANDS.iter().copied(),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::DEFAULT_DEPS_DIR;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_defaults_without_config() {
        let temp = TempDir::new().unwrap();
        let context = ProjectContext::load(temp.path(), None).unwrap();
        assert_eq!(
            context.config().layout.deps_dir,
            temp.path().join(DEFAULT_DEPS_DIR)
        );
    }

    #[test]
    fn addon_uses_configured_python() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".localdeps")).unwrap();
        fs::write(
            temp.path().join(".localdeps/config.yml"),
            "python: /opt/python/bin/python3.11\n",
        )
        .unwrap();

        let context = ProjectContext::load(temp.path(), None).unwrap();
        let addon = context.addon();

        assert_eq!(
            addon.checker().installer().python(),
            Path::new("/opt/python/bin/python3.11")
        );
        assert_eq!(addon.commands().gated, ["exercise"]);
    }

    #[test]
    fn name_is_root_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("my-plugin");
        fs::create_dir_all(&root).unwrap();
        let context = ProjectContext::load(&root, None).unwrap();
        assert_eq!(context.name(), "my-plugin");
    }
}
