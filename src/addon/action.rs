//! The "Install dependencies" action.
//!
//! Installs can take minutes, so a host may run them off its main thread
//! while still polling whether the action should be enabled. The busy flag
//! is shared between clones of an [`InstallAction`]; only one install runs
//! at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Addon, CommandHost};
use crate::requirements::{PackageInstaller, Resolver};

/// Result of [`InstallAction::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Dependencies are installed and the gated commands registered.
    Installed,
    /// The install did not leave every requirement satisfied.
    Failed,
    /// Another install was already running; nothing was done.
    Busy,
}

/// Single-flight install action with a shared busy flag.
#[derive(Debug, Clone, Default)]
pub struct InstallAction {
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl InstallAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an install is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the busy flag, or `None` if it is already held.
    pub fn try_begin(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Whether the action should be offered: not busy and not satisfied.
    pub fn poll<R: Resolver, I: PackageInstaller>(&self, addon: &mut Addon<R, I>) -> bool {
        !self.is_busy() && !addon.checker_mut().is_satisfied(false)
    }

    /// Install, then register the gated commands on success.
    pub fn execute<R: Resolver, I: PackageInstaller>(
        &self,
        addon: &mut Addon<R, I>,
        host: &mut dyn CommandHost,
    ) -> InstallOutcome {
        let Some(_guard) = self.try_begin() else {
            tracing::warn!("{}: install already in progress", addon.name());
            return InstallOutcome::Busy;
        };

        if !addon.checker_mut().install() {
            return InstallOutcome::Failed;
        }

        addon.register_gated(host);
        InstallOutcome::Installed
    }
}
