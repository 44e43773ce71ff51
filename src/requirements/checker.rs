//! Dependency checker for a plugin's private install directory.
//!
//! The `DependencyChecker` answers "are the plugin's dependencies
//! installed?", caching the answer until a forced re-check, and can run the
//! installer to make the answer true.
//!
//! # Lifecycle
//!
//! - The cached [`InstallState`] starts `Unknown`.
//! - Any check moves it to `Satisfied` or `Unsatisfied`.
//! - A forced check, [`DependencyChecker::invalidate`], or an install
//!   attempt resets it to `Unknown` before re-deriving it.
//!
//! Forcing a satisfaction check also re-reads the manifest. Forcing
//! [`DependencyChecker::requirement_names`] only re-reads the manifest.
//!
//! The checker is not internally synchronized. Callers that may invoke it
//! from several places at once must serialize access (see
//! [`crate::addon::InstallAction`] for a single-flight install guard).

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InstallError, ManifestError, ResolutionError};
use crate::manifest::{ManifestReader, RequirementSpec};
use crate::requirements::installer::{PackageInstaller, PipInstaller};
use crate::requirements::resolver::{DistInfoResolver, Resolver};
use crate::requirements::search_path::SearchPath;
use crate::requirements::status::{GapResult, InstallRecord, InstallState, RequirementStatus};

/// Default manifest file name, at the plugin root.
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Default private install directory name, at the plugin root.
pub const DEFAULT_DEPS_DIR: &str = "deps_public";

/// Where the manifest and the private install directory live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepsLayout {
    /// The requirements manifest.
    pub manifest: PathBuf,
    /// The private install directory.
    pub deps_dir: PathBuf,
}

impl DepsLayout {
    /// Layout with explicit paths.
    pub fn new(manifest: impl Into<PathBuf>, deps_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
            deps_dir: deps_dir.into(),
        }
    }

    /// Default layout beside the plugin's code at `root`.
    pub fn beside(root: &Path) -> Self {
        Self::new(root.join(DEFAULT_MANIFEST), root.join(DEFAULT_DEPS_DIR))
    }
}

/// Cached manifest entries and when they were read.
#[derive(Debug, Clone)]
struct ManifestCache {
    specs: Vec<RequirementSpec>,
    loaded_at: DateTime<Utc>,
}

/// Checks, and on request installs, a plugin's dependencies.
pub struct DependencyChecker<R = DistInfoResolver, I = PipInstaller> {
    layout: DepsLayout,
    reader: ManifestReader,
    resolver: R,
    installer: I,
    record: InstallRecord,
    manifest: Option<ManifestCache>,
    search_path: SearchPath,
}

impl<R: Resolver, I: PackageInstaller> DependencyChecker<R, I> {
    /// Create a checker. The private directory is put on the search path
    /// here, once, whether or not it exists yet.
    pub fn new(layout: DepsLayout, resolver: R, installer: I) -> Self {
        let mut search_path = SearchPath::new();
        search_path.register(&layout.deps_dir);

        Self {
            reader: ManifestReader::new(&layout.manifest),
            record: InstallRecord::unknown(&layout.deps_dir),
            layout,
            resolver,
            installer,
            manifest: None,
            search_path,
        }
    }

    /// The paths this checker works with.
    pub fn layout(&self) -> &DepsLayout {
        &self.layout
    }

    /// The cached state and when it was set.
    pub fn record(&self) -> &InstallRecord {
        &self.record
    }

    /// The cached state.
    pub fn state(&self) -> InstallState {
        self.record.state
    }

    /// Search path containing the private directory.
    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// When the manifest cache was last filled, if ever.
    pub fn manifest_loaded_at(&self) -> Option<DateTime<Utc>> {
        self.manifest.as_ref().map(|m| m.loaded_at)
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn installer(&self) -> &I {
        &self.installer
    }

    pub fn installer_mut(&mut self) -> &mut I {
        &mut self.installer
    }

    /// Forget the cached install state.
    pub fn invalidate(&mut self) {
        self.record.reset();
    }

    /// Whether every requirement resolves from the private directory.
    ///
    /// Returns the cached answer without I/O unless `force_refresh` is set
    /// or nothing is cached. Errors are logged and reported as `false`.
    pub fn is_satisfied(&mut self, force_refresh: bool) -> bool {
        if force_refresh {
            self.invalidate();
        } else if let Some(cached) = self.record.state.as_bool() {
            return cached;
        }

        let satisfied = match self.scan(force_refresh) {
            Ok(None) => {
                tracing::debug!(
                    "Dependency directory {} does not exist",
                    self.layout.deps_dir.display()
                );
                false
            }
            Ok(Some(gaps)) => all_satisfied(&gaps),
            Err(e) => {
                tracing::warn!("Caught error while checking dependencies: {}", e);
                false
            }
        };

        self.record.set(satisfied);
        satisfied
    }

    /// Per-requirement status, for diagnostics. Also refreshes the cached
    /// install state.
    pub fn check_report(&mut self, force_refresh: bool) -> Result<Vec<GapResult>, ManifestError> {
        if force_refresh {
            self.invalidate();
        }

        let gaps = match self.scan(force_refresh) {
            Ok(Some(gaps)) => gaps,
            Ok(None) => {
                self.refresh_manifest(force_refresh)?;
                self.cached_specs()
                    .iter()
                    .map(|spec| GapResult {
                        requirement: spec.to_string(),
                        status: RequirementStatus::Missing,
                    })
                    .collect()
            }
            Err(e) => {
                self.record.set(false);
                return Err(e);
            }
        };

        let satisfied = self.layout.deps_dir.is_dir() && all_satisfied(&gaps);
        self.record.set(satisfied);
        Ok(gaps)
    }

    /// Install the manifest into the private directory.
    ///
    /// Returns `true` only when an independent check after the installer
    /// exits confirms every requirement resolves.
    pub fn install(&mut self) -> bool {
        if self.is_satisfied(false) {
            tracing::info!("Dependencies already satisfied; nothing to install");
            return true;
        }

        let outcome = self.run_installer();
        self.record.reset();

        match outcome {
            Ok(()) => {
                let satisfied = self.is_satisfied(true);
                if !satisfied {
                    tracing::warn!(
                        "Installer reported success but dependencies in {} are still not satisfied",
                        self.layout.deps_dir.display()
                    );
                }
                satisfied
            }
            Err(e) => {
                match &e {
                    InstallError::DirectoryCreate { path, .. } => {
                        tracing::error!("{} (folder: {})", e, path.display())
                    }
                    _ => tracing::error!("{} (requirements: {})", e, self.layout.manifest.display()),
                }
                self.record.set(false);
                false
            }
        }
    }

    /// Requirement names in manifest order, for display.
    ///
    /// Served from the manifest cache unless `force_refresh` is set.
    pub fn requirement_names(&mut self, force_refresh: bool) -> Result<Vec<String>, ManifestError> {
        self.refresh_manifest(force_refresh)?;
        Ok(self
            .cached_specs()
            .iter()
            .map(|spec| spec.name.clone())
            .collect())
    }

    /// Parsed requirements, cached like [`Self::requirement_names`].
    pub fn requirements(&mut self, force_refresh: bool) -> Result<Vec<RequirementSpec>, ManifestError> {
        self.refresh_manifest(force_refresh)?;
        Ok(self.cached_specs().to_vec())
    }

    fn run_installer(&self) -> Result<(), InstallError> {
        let dir = &self.layout.deps_dir;
        fs::create_dir_all(dir).map_err(|source| InstallError::DirectoryCreate {
            path: dir.clone(),
            source,
        })?;

        self.installer.ensure_latest()?;
        self.installer.install(&self.layout.manifest, dir)
    }

    fn refresh_manifest(&mut self, reload: bool) -> Result<(), ManifestError> {
        if !reload && self.manifest.is_some() {
            return Ok(());
        }

        match self.reader.read() {
            Ok(specs) => {
                self.manifest = Some(ManifestCache {
                    specs,
                    loaded_at: Utc::now(),
                });
                Ok(())
            }
            Err(e) => {
                self.manifest = None;
                Err(e)
            }
        }
    }

    fn cached_specs(&self) -> &[RequirementSpec] {
        self.manifest
            .as_ref()
            .map(|m| m.specs.as_slice())
            .unwrap_or_default()
    }

    /// Resolve every requirement. `Ok(None)` when the private directory
    /// does not exist, in which case nothing is resolved.
    fn scan(&mut self, reload: bool) -> Result<Option<Vec<GapResult>>, ManifestError> {
        if !self.layout.deps_dir.is_dir() {
            return Ok(None);
        }

        self.refresh_manifest(reload)?;
        Ok(Some(resolve_all(
            &self.resolver,
            self.cached_specs(),
            &self.layout.deps_dir,
        )))
    }
}

fn all_satisfied(gaps: &[GapResult]) -> bool {
    gaps.iter().all(|g| g.status.is_satisfied())
}

fn resolve_all<R: Resolver>(resolver: &R, specs: &[RequirementSpec], dir: &Path) -> Vec<GapResult> {
    let mut failures = Vec::new();

    let gaps: Vec<GapResult> = specs
        .iter()
        .map(|spec| {
            let status = match resolver.resolve(spec, dir) {
                Ok(dist) => RequirementStatus::Satisfied {
                    version: dist.version,
                },
                Err(e) => {
                    failures.push(e.to_string());
                    status_for_error(e)
                }
            };
            GapResult {
                requirement: spec.to_string(),
                status,
            }
        })
        .collect();

    if !failures.is_empty() {
        tracing::info!(
            "{} of {} requirement(s) unresolved: {}",
            failures.len(),
            specs.len(),
            failures.join("; ")
        );
    }

    gaps
}

fn status_for_error(err: ResolutionError) -> RequirementStatus {
    match err {
        ResolutionError::NotFound { .. } => RequirementStatus::Missing,
        ResolutionError::VersionMismatch {
            found, constraint, ..
        } => RequirementStatus::VersionMismatch { found, constraint },
        other => RequirementStatus::Error {
            message: other.to_string(),
        },
    }
}
