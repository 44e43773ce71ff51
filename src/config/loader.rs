//! Configuration file discovery and loading.
//!
//! This module handles finding and loading configuration files from
//! the project's `.localdeps` directory in the correct priority order.

use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::LocaldepsConfig;
use crate::error::{LocaldepsError, Result};

/// Directory holding configuration under the project root.
pub const CONFIG_DIR: &str = ".localdeps";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. Project config (`.localdeps/config.yml`)
/// 2. Local overrides (`.localdeps/config.local.yml`)
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project config: .localdeps/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .localdeps/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            project: existing(project_root.join(CONFIG_DIR).join("config.yml")),
            project_local: existing(project_root.join(CONFIG_DIR).join("config.local.yml")),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(&self.project_local).collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Find the project root by walking up from `start`.
///
/// A directory holding `.localdeps/` wins; otherwise the nearest directory
/// holding a `requirements.txt`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut fallback = None;

    for dir in start.ancestors() {
        if dir.join(CONFIG_DIR).is_dir() {
            return Some(dir.to_path_buf());
        }
        if fallback.is_none() && dir.join(crate::requirements::DEFAULT_MANIFEST).is_file() {
            fallback = Some(dir.to_path_buf());
        }
    }

    fallback
}

/// Parse YAML content into a config.
pub fn parse_config(content: &str, source_path: &Path) -> Result<LocaldepsConfig> {
    serde_yaml::from_str(content).map_err(|e| LocaldepsError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as a raw YAML value (for merging).
fn load_config_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LocaldepsError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            LocaldepsError::Io(e)
        }
    })?;

    let value: Value =
        serde_yaml::from_str(&content).map_err(|e| LocaldepsError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(if value.is_null() {
        Value::Mapping(Default::default())
    } else {
        value
    })
}

/// Overlay `overlay` onto `base`. Mappings merge key by key; anything else
/// in the overlay replaces the base value. A null overlay value removes the
/// key.
fn merge_value(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                if value.is_null() {
                    base_map.remove(&key);
                    continue;
                }
                let merged = match base_map.remove(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => value,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Load and merge the project and local config files. Missing files are
/// fine: with none present the defaults apply.
pub fn load_merged_config(project_root: &Path) -> Result<LocaldepsConfig> {
    let paths = ConfigPaths::discover(project_root);

    let mut merged = Value::Mapping(Default::default());
    for path in paths.all_existing() {
        tracing::debug!("Loading config from {}", path.display());
        merged = merge_value(merged, load_config_value(path)?);
    }

    serde_yaml::from_value(merged).map_err(|e| LocaldepsError::ConfigParseError {
        path: project_root.join(CONFIG_DIR).join("config.yml"),
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Load config with optional path override, then apply environment
/// overrides and validate.
///
/// If `config_override` is provided, loads only that file without merging.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<LocaldepsConfig> {
    let mut config = match config_override {
        Some(path) => {
            let value = load_config_value(path)?;
            serde_yaml::from_value(value).map_err(|e| LocaldepsError::ConfigParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        }
        None => load_merged_config(project_root)?,
    };

    config.apply_env_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(root: &Path, name: &str, content: &str) {
        let dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn discover_finds_project_and_local() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "config.yml", "");
        write_config(temp.path(), "config.local.yml", "");

        let paths = ConfigPaths::discover(temp.path());
        assert!(paths.project.is_some());
        assert!(paths.project_local.is_some());
        assert_eq!(paths.all_existing().len(), 2);
    }

    #[test]
    fn discover_returns_none_for_missing_configs() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::discover(temp.path());
        assert!(paths.project.is_none());
        assert!(paths.all_existing().is_empty());
    }

    #[test]
    fn missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_merged_config(temp.path()).unwrap();
        assert_eq!(config, LocaldepsConfig::default());
    }

    #[test]
    fn local_overrides_project() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "config.yml",
            "deps_dir: vendor\npython: /usr/bin/python3\n",
        );
        write_config(temp.path(), "config.local.yml", "python: /opt/py/bin/python\n");

        let config = load_merged_config(temp.path()).unwrap();
        assert_eq!(config.deps_dir, Some(PathBuf::from("vendor")));
        assert_eq!(config.python, Some(PathBuf::from("/opt/py/bin/python")));
    }

    #[test]
    fn local_null_removes_key() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "config.yml", "install_timeout_secs: 600\n");
        write_config(temp.path(), "config.local.yml", "install_timeout_secs: ~\n");

        let config = load_merged_config(temp.path()).unwrap();
        assert_eq!(config.install_timeout_secs, None);
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "config.yml", "deps_dir: [");

        let result = load_merged_config(temp.path());
        assert!(matches!(result, Err(LocaldepsError::ConfigParseError { .. })));
    }

    #[test]
    fn override_file_skips_discovery() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "config.yml", "deps_dir: vendor\n");
        let custom = temp.path().join("custom.yml");
        fs::write(&custom, "deps_dir: elsewhere\n").unwrap();

        let config = load_config(temp.path(), Some(&custom)).unwrap();
        assert_eq!(config.deps_dir, Some(PathBuf::from("elsewhere")));
    }

    #[test]
    fn missing_override_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_config(temp.path(), Some(&temp.path().join("nope.yml")));
        assert!(matches!(result, Err(LocaldepsError::ConfigNotFound { .. })));
    }

    #[test]
    fn load_config_validates() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "config.yml", "install_timeout_secs: 0\n");

        let result = load_config(temp.path(), None);
        assert!(matches!(
            result,
            Err(LocaldepsError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn parse_config_accepts_empty_content() {
        let config = parse_config("", Path::new("config.yml")).unwrap();
        assert_eq!(config, LocaldepsConfig::default());
    }

    #[test]
    fn find_project_root_prefers_config_dir() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("plugin").join("src");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("plugin").join("requirements.txt"), "six\n").unwrap();
        fs::create_dir_all(temp.path().join(CONFIG_DIR)).unwrap();

        assert_eq!(find_project_root(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn find_project_root_falls_back_to_manifest() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("requirements.txt"), "six\n").unwrap();

        assert_eq!(find_project_root(&nested), Some(temp.path().to_path_buf()));
    }
}
