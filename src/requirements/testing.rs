//! Test doubles for the checker's collaborators.

use std::cell::Cell;
use std::path::Path;

use crate::error::{InstallError, ResolutionError};
use crate::manifest::RequirementSpec;
use crate::requirements::installer::PackageInstaller;
use crate::requirements::resolver::{DistInfoResolver, ResolvedDistribution, Resolver};

pub(crate) use crate::requirements::resolver::write_dist_info;

/// Counts resolution calls while delegating to the real resolver.
#[derive(Default)]
pub(crate) struct CountingResolver {
    inner: DistInfoResolver,
    pub(crate) calls: Cell<usize>,
}

impl Resolver for CountingResolver {
    fn resolve(
        &self,
        spec: &RequirementSpec,
        dir: &Path,
    ) -> Result<ResolvedDistribution, ResolutionError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.resolve(spec, dir)
    }
}

/// Installer double: optionally fails, optionally writes packages.
#[derive(Default)]
pub(crate) struct FakeInstaller {
    pub(crate) bootstrap_fails: bool,
    pub(crate) install_fails: bool,
    pub(crate) writes: Vec<(&'static str, &'static str)>,
    pub(crate) bootstrap_calls: Cell<usize>,
    pub(crate) install_calls: Cell<usize>,
}

impl FakeInstaller {
    /// An installer that succeeds and lands the given packages.
    pub(crate) fn landing(writes: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            writes,
            ..Default::default()
        }
    }
}

impl PackageInstaller for FakeInstaller {
    fn ensure_latest(&self) -> Result<(), InstallError> {
        self.bootstrap_calls.set(self.bootstrap_calls.get() + 1);
        if self.bootstrap_fails {
            return Err(InstallError::ToolBootstrap {
                message: "ensurepip unavailable".into(),
            });
        }
        Ok(())
    }

    fn install(&self, _manifest: &Path, target: &Path) -> Result<(), InstallError> {
        self.install_calls.set(self.install_calls.get() + 1);
        if self.install_fails {
            return Err(InstallError::SubprocessInstall {
                code: Some(1),
                message: "No matching distribution".into(),
            });
        }
        for (name, version) in &self.writes {
            write_dist_info(target, name, version);
        }
        Ok(())
    }
}
