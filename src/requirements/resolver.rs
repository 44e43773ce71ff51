//! Resolving requirements against installed distribution metadata.
//!
//! Packages installed with `pip install --target` leave a
//! `<name>-<version>.dist-info/METADATA` file (or, for legacy installs,
//! an `.egg-info` directory or file) next to the importable code. The
//! resolver only ever looks inside the directory it is given, so a package
//! importable from the host interpreter's own site-packages never counts.
//! The same holds for what a package declares in `Requires-Dist`: a
//! requirement is only satisfied when its dependencies are installed there
//! too.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ResolutionError;
use crate::manifest::{normalize_name, RequirementSpec, Version};

/// An installed distribution that satisfied a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDistribution {
    /// Name from the metadata.
    pub name: String,
    /// Version from the metadata.
    pub version: String,
    /// Metadata file that was read.
    pub metadata_path: PathBuf,
}

/// Resolves one requirement using only `dir` as the search scope.
pub trait Resolver {
    fn resolve(
        &self,
        spec: &RequirementSpec,
        dir: &Path,
    ) -> Result<ResolvedDistribution, ResolutionError>;
}

/// Resolver that reads `.dist-info` / `.egg-info` metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistInfoResolver;

impl DistInfoResolver {
    pub fn new() -> Self {
        Self
    }
}

/// Metadata headers we care about.
#[derive(Debug)]
struct Metadata {
    name: String,
    version: String,
    requires: Vec<String>,
}

impl Resolver for DistInfoResolver {
    /// Resolve `spec` and every unconditional `Requires-Dist` entry it
    /// pulls in, all from `dir`.
    fn resolve(
        &self,
        spec: &RequirementSpec,
        dir: &Path,
    ) -> Result<ResolvedDistribution, ResolutionError> {
        let (resolved, requires) = find_distribution(spec, dir)?;

        let mut seen = HashSet::new();
        let mut pending: Vec<(String, String)> = requires
            .into_iter()
            .map(|line| (resolved.name.clone(), line))
            .collect();

        while let Some((parent, line)) = pending.pop() {
            let Some(dependency) = dependency_spec(&line) else {
                continue;
            };
            if dependency.normalized_name() == spec.normalized_name()
                || !seen.insert(dependency.to_string())
            {
                continue;
            }
            match find_distribution(&dependency, dir) {
                Ok((found, more)) => {
                    pending.extend(more.into_iter().map(|line| (found.name.clone(), line)));
                }
                Err(e) => {
                    return Err(ResolutionError::DependencyUnmet {
                        name: spec.name.clone(),
                        dependency: dependency.to_string(),
                        required_by: parent,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(resolved)
    }
}

/// Find the installed distribution for `spec`, with its `Requires-Dist`
/// lines.
fn find_distribution(
    spec: &RequirementSpec,
    dir: &Path,
) -> Result<(ResolvedDistribution, Vec<String>), ResolutionError> {
    let wanted = spec.normalized_name();
    let entries = fs::read_dir(dir).map_err(|source| ResolutionError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut mismatch = None;
    let mut corrupt = None;

    for entry in entries {
        let entry = entry.map_err(|source| ResolutionError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some(metadata_path) = metadata_file(&entry.path(), file_name) else {
            continue;
        };
        if !distribution_stem_matches(file_name, &wanted) {
            continue;
        }

        let metadata = match read_metadata(&metadata_path) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", metadata_path.display(), e);
                corrupt = Some(e);
                continue;
            }
        };
        if normalize_name(&metadata.name) != wanted {
            continue;
        }

        let Some(version) = Version::parse(&metadata.version) else {
            corrupt = Some(ResolutionError::Metadata {
                path: metadata_path,
                message: format!("unparseable version '{}'", metadata.version),
            });
            continue;
        };

        if spec.accepts(&version) {
            let resolved = ResolvedDistribution {
                name: metadata.name,
                version: metadata.version,
                metadata_path,
            };
            return Ok((resolved, metadata.requires));
        }

        mismatch = Some(ResolutionError::VersionMismatch {
            name: spec.name.clone(),
            found: metadata.version,
            constraint: spec.version_constraint.clone().unwrap_or_default(),
        });
    }

    Err(mismatch.or(corrupt).unwrap_or_else(|| ResolutionError::NotFound {
        name: spec.name.clone(),
        dir: dir.to_path_buf(),
    }))
}

/// Parse a `Requires-Dist` value such as `urllib3<3,>=1.21.1` or the older
/// `urllib3 (>=1.21.1)`.
///
/// Entries gated by an environment marker are skipped: markers are never
/// evaluated, and most of them name optional extras.
fn dependency_spec(line: &str) -> Option<RequirementSpec> {
    match RequirementSpec::parse(line) {
        Ok(spec) if spec.marker.is_none() => Some(spec),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Ignoring Requires-Dist '{}': {}", line, e);
            None
        }
    }
}

/// Locate the metadata file for a `*.dist-info` / `*.egg-info` entry.
fn metadata_file(path: &Path, file_name: &str) -> Option<PathBuf> {
    if file_name.ends_with(".dist-info") {
        Some(path.join("METADATA"))
    } else if file_name.ends_with(".egg-info") {
        if path.is_dir() {
            Some(path.join("PKG-INFO"))
        } else {
            Some(path.to_path_buf())
        }
    } else {
        None
    }
}

/// Cheap filter on the entry name before its metadata is read.
///
/// Wheel installers escape `-` in names as `_`, so a `.dist-info` name is
/// everything before the first `-`. Legacy `.egg-info` names may keep a
/// literal `-` (`python-dateutil-2.8.2-py3.11.egg-info`), so any entry whose
/// name starts with the wanted one is read and the `Name:` header decides.
fn distribution_stem_matches(file_name: &str, wanted: &str) -> bool {
    if let Some(stem) = file_name.strip_suffix(".dist-info") {
        let name = stem.split('-').next().unwrap_or(stem);
        return normalize_name(name) == wanted;
    }
    let stem = file_name.strip_suffix(".egg-info").unwrap_or(file_name);
    normalize_name(stem)
        .strip_prefix(wanted)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
}

fn read_metadata(path: &Path) -> Result<Metadata, ResolutionError> {
    let text = fs::read_to_string(path).map_err(|source| ResolutionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut name = None;
    let mut version = None;
    let mut requires = Vec::new();
    // Headers end at the first blank line; the description follows.
    for line in text.lines().take_while(|l| !l.trim().is_empty()) {
        if let Some(value) = line.strip_prefix("Name:") {
            name.get_or_insert_with(|| value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Version:") {
            version.get_or_insert_with(|| value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Requires-Dist:") {
            requires.push(value.trim().to_string());
        }
    }

    match (name, version) {
        (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
            Ok(Metadata {
                name,
                version,
                requires,
            })
        }
        _ => Err(ResolutionError::Metadata {
            path: path.to_path_buf(),
            message: "missing Name or Version header".to_string(),
        }),
    }
}

/// Write a minimal `.dist-info` entry, as an installer would.
#[cfg(test)]
pub(crate) fn write_dist_info(dir: &Path, name: &str, version: &str) {
    let info = dir.join(format!("{}-{}.dist-info", name.replace('-', "_"), version));
    fs::create_dir_all(&info).unwrap();
    fs::write(
        info.join("METADATA"),
        format!(
            "Metadata-Version: 2.1\nName: {}\nVersion: {}\n\nLong description.\n",
            name, version
        ),
    )
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(s: &str) -> RequirementSpec {
        RequirementSpec::parse(s).unwrap()
    }

    #[test]
    fn resolves_installed_package() {
        let temp = TempDir::new().unwrap();
        write_dist_info(temp.path(), "six", "1.16.0");

        let resolved = DistInfoResolver::new()
            .resolve(&spec("six>=1.10,<2.0"), temp.path())
            .unwrap();
        assert_eq!(resolved.name, "six");
        assert_eq!(resolved.version, "1.16.0");
        assert!(resolved.metadata_path.ends_with("METADATA"));
    }

    #[test]
    fn missing_package_is_not_found() {
        let temp = TempDir::new().unwrap();
        write_dist_info(temp.path(), "requests", "2.31.0");

        let err = DistInfoResolver::new()
            .resolve(&spec("six"), temp.path())
            .unwrap_err();
        assert!(matches!(err, ResolutionError::NotFound { .. }));
    }

    #[test]
    fn wrong_version_is_mismatch() {
        let temp = TempDir::new().unwrap();
        write_dist_info(temp.path(), "six", "1.9.0");

        let err = DistInfoResolver::new()
            .resolve(&spec("six>=1.10"), temp.path())
            .unwrap_err();
        match err {
            ResolutionError::VersionMismatch { found, constraint, .. } => {
                assert_eq!(found, "1.9.0");
                assert_eq!(constraint, ">=1.10");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn names_match_after_normalization() {
        let temp = TempDir::new().unwrap();
        write_dist_info(temp.path(), "typing-extensions", "4.9.0");

        let resolved = DistInfoResolver::new()
            .resolve(&spec("Typing.Extensions"), temp.path())
            .unwrap();
        assert_eq!(resolved.version, "4.9.0");
    }

    #[test]
    fn corrupt_metadata_is_reported() {
        let temp = TempDir::new().unwrap();
        let info = temp.path().join("six-1.16.0.dist-info");
        fs::create_dir_all(&info).unwrap();
        fs::write(info.join("METADATA"), "Metadata-Version: 2.1\n").unwrap();

        let err = DistInfoResolver::new()
            .resolve(&spec("six"), temp.path())
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Metadata { .. }));
    }

    #[test]
    fn egg_info_file_is_read() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("six-1.16.0-py3.11.egg-info"),
            "Metadata-Version: 1.1\nName: six\nVersion: 1.16.0\n",
        )
        .unwrap();

        let resolved = DistInfoResolver::new()
            .resolve(&spec("six==1.16.0"), temp.path())
            .unwrap();
        assert_eq!(resolved.version, "1.16.0");
    }

    #[test]
    fn missing_directory_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = DistInfoResolver::new()
            .resolve(&spec("six"), &temp.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Io { .. }));
    }

    #[test]
    fn description_headers_are_ignored() {
        let temp = TempDir::new().unwrap();
        let info = temp.path().join("six-1.16.0.dist-info");
        fs::create_dir_all(&info).unwrap();
        fs::write(
            info.join("METADATA"),
            "Name: six\nVersion: 1.16.0\n\nVersion: 0.0.1 in the readme\n",
        )
        .unwrap();

        let resolved = DistInfoResolver::new()
            .resolve(&spec("six"), temp.path())
            .unwrap();
        assert_eq!(resolved.version, "1.16.0");
    }

    fn write_metadata(dir: &Path, entry: &str, metadata: &str) {
        let info = dir.join(entry);
        fs::create_dir_all(&info).unwrap();
        fs::write(info.join("METADATA"), metadata).unwrap();
    }

    #[test]
    fn unmet_requires_dist_leaves_requirement_unresolved() {
        let temp = TempDir::new().unwrap();
        write_metadata(
            temp.path(),
            "requests-2.31.0.dist-info",
            "Name: requests\nVersion: 2.31.0\n\
             Requires-Dist: urllib3<3,>=1.21.1\n\
             Requires-Dist: PySocks!=1.5.7,>=1.5.6; extra == \"socks\"\n",
        );

        let err = DistInfoResolver::new()
            .resolve(&spec("requests"), temp.path())
            .unwrap_err();
        match err {
            ResolutionError::DependencyUnmet {
                dependency,
                required_by,
                ..
            } => {
                assert_eq!(dependency, "urllib3<3,>=1.21.1");
                assert_eq!(required_by, "requests");
            }
            other => panic!("unexpected error: {other}"),
        }

        write_dist_info(temp.path(), "urllib3", "2.0.7");
        let resolved = DistInfoResolver::new()
            .resolve(&spec("requests"), temp.path())
            .unwrap();
        assert_eq!(resolved.version, "2.31.0");
    }

    #[test]
    fn requires_dist_is_followed_transitively() {
        let temp = TempDir::new().unwrap();
        write_metadata(
            temp.path(),
            "flask-3.0.0.dist-info",
            "Name: Flask\nVersion: 3.0.0\nRequires-Dist: Jinja2 (>=3.1.2)\n",
        );
        write_metadata(
            temp.path(),
            "Jinja2-3.1.2.dist-info",
            "Name: Jinja2\nVersion: 3.1.2\nRequires-Dist: MarkupSafe>=2.0\n",
        );

        let err = DistInfoResolver::new()
            .resolve(&spec("flask"), temp.path())
            .unwrap_err();
        assert!(err.to_string().contains("required by Jinja2"));

        write_dist_info(temp.path(), "MarkupSafe", "2.1.3");
        assert!(DistInfoResolver::new()
            .resolve(&spec("flask"), temp.path())
            .is_ok());
    }

    #[test]
    fn requires_dist_version_mismatch_is_unmet() {
        let temp = TempDir::new().unwrap();
        write_metadata(
            temp.path(),
            "requests-2.31.0.dist-info",
            "Name: requests\nVersion: 2.31.0\nRequires-Dist: idna<4,>=2.5\n",
        );
        write_dist_info(temp.path(), "idna", "1.0");

        let err = DistInfoResolver::new()
            .resolve(&spec("requests"), temp.path())
            .unwrap_err();
        assert!(matches!(err, ResolutionError::DependencyUnmet { .. }));
        assert!(err.to_string().contains("does not satisfy"));
    }

    #[test]
    fn requires_dist_cycles_terminate() {
        let temp = TempDir::new().unwrap();
        write_metadata(
            temp.path(),
            "alpha-1.0.dist-info",
            "Name: alpha\nVersion: 1.0\nRequires-Dist: beta\n",
        );
        write_metadata(
            temp.path(),
            "beta-1.0.dist-info",
            "Name: beta\nVersion: 1.0\nRequires-Dist: alpha>=1.0\n",
        );

        let resolved = DistInfoResolver::new()
            .resolve(&spec("alpha"), temp.path())
            .unwrap();
        assert_eq!(resolved.name, "alpha");
    }

    #[test]
    fn egg_info_with_dash_in_name_is_read() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("python-dateutil-2.8.2-py3.11.egg-info"),
            "Metadata-Version: 1.1\nName: python-dateutil\nVersion: 2.8.2\n",
        )
        .unwrap();

        let resolved = DistInfoResolver::new()
            .resolve(&spec("python_dateutil>=2.8"), temp.path())
            .unwrap();
        assert_eq!(resolved.name, "python-dateutil");
        assert!(DistInfoResolver::new()
            .resolve(&spec("python"), temp.path())
            .is_err());
    }
}
