//! Plugin-side glue around the dependency checker.
//!
//! A plugin has two kinds of commands: preference commands that work
//! without any third-party packages (the install button, the settings
//! panel) and gated commands that import them. [`Addon`] registers the
//! first kind unconditionally and the second only once dependencies are
//! satisfied.
//!
//! # Modules
//!
//! - [`action`] - The single-flight install action
//! - [`exercise`] - Import test through the interpreter
//! - [`panel`] - Preferences and tool panel rendering

pub mod action;
pub mod exercise;
pub mod panel;

pub use action::{BusyGuard, InstallAction, InstallOutcome};
pub use exercise::{exercise, ExerciseReport};
pub use panel::{render_preferences, render_tool_panel, NOT_INSTALLED};

use crate::requirements::{
    DependencyChecker, DistInfoResolver, PackageInstaller, PipInstaller, Resolver,
};

/// The host application's command registry.
pub trait CommandHost {
    fn register(&mut self, id: &str);
    fn unregister(&mut self, id: &str);
}

/// Command ids a plugin contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonCommands {
    /// Registered whether or not dependencies are installed.
    pub preferences: Vec<String>,
    /// Registered only while dependencies are satisfied.
    pub gated: Vec<String>,
}

impl AddonCommands {
    pub fn new<P, G>(preferences: P, gated: G) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            preferences: preferences.into_iter().map(Into::into).collect(),
            gated: gated.into_iter().map(Into::into).collect(),
        }
    }
}

/// A plugin: its name, its commands and its dependency checker.
pub struct Addon<R = DistInfoResolver, I = PipInstaller> {
    name: String,
    checker: DependencyChecker<R, I>,
    commands: AddonCommands,
    gated_registered: bool,
}

impl<R: Resolver, I: PackageInstaller> Addon<R, I> {
    pub fn new(name: impl Into<String>, checker: DependencyChecker<R, I>, commands: AddonCommands) -> Self {
        Self {
            name: name.into(),
            checker,
            commands,
            gated_registered: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &AddonCommands {
        &self.commands
    }

    pub fn checker(&self) -> &DependencyChecker<R, I> {
        &self.checker
    }

    pub fn checker_mut(&mut self) -> &mut DependencyChecker<R, I> {
        &mut self.checker
    }

    /// Whether the gated commands are currently registered with a host.
    pub fn gated_registered(&self) -> bool {
        self.gated_registered
    }

    /// Register preference commands, then gated commands if a fresh check
    /// says dependencies are satisfied.
    pub fn register(&mut self, host: &mut dyn CommandHost) {
        for id in &self.commands.preferences {
            host.register(id);
        }

        if self.checker.is_satisfied(true) {
            self.register_gated(host);
        } else {
            tracing::info!(
                "{}: dependencies are not installed; {} command(s) stay unavailable",
                self.name,
                self.commands.gated.len()
            );
        }
    }

    /// Undo [`Self::register`]: gated commands first, then preference
    /// commands, each in reverse order.
    pub fn unregister(&mut self, host: &mut dyn CommandHost) {
        if self.gated_registered {
            for id in self.commands.gated.iter().rev() {
                host.unregister(id);
            }
            self.gated_registered = false;
        }

        for id in self.commands.preferences.iter().rev() {
            host.unregister(id);
        }
    }

    /// Register the gated commands unless they already are.
    pub(crate) fn register_gated(&mut self, host: &mut dyn CommandHost) {
        if self.gated_registered {
            return;
        }
        for id in &self.commands.gated {
            host.register(id);
        }
        self.gated_registered = true;
    }
}

/// A [`CommandHost`] that records calls; stands in for a real host.
#[derive(Debug, Default)]
pub struct RecordingHost {
    active: Vec<String>,
    events: Vec<HostEvent>,
}

/// One call made on a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Registered(String),
    Unregistered(String),
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently registered ids, in registration order.
    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.active.iter().any(|a| a == id)
    }

    /// Every call, in order.
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }
}

impl CommandHost for RecordingHost {
    fn register(&mut self, id: &str) {
        if !self.is_registered(id) {
            self.active.push(id.to_string());
        }
        self.events.push(HostEvent::Registered(id.to_string()));
    }

    fn unregister(&mut self, id: &str) {
        self.active.retain(|a| a != id);
        self.events.push(HostEvent::Unregistered(id.to_string()));
    }
}
