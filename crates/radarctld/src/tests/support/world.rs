//! BDD test world for bootstrap scenarios.

use std::cell::RefCell;
use std::sync::Arc;

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, bootstrap_with};
use crate::command::StaticReply;
use crate::dispatch::CommandRegistry;

use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    registry: Option<CommandRegistry>,
    daemon: Option<Daemon>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::new()),
            reporter: Arc::new(RecordingHealthReporter::default()),
            registry: Some(CommandRegistry::new()),
            daemon: None,
            bootstrap_error: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
    }

    /// Installs a loader that succeeds.
    pub fn use_successful_loader(&mut self) {
        self.loader = Box::new(TestConfigLoader::new());
    }

    /// Registers an instrument command replying with `reply`.
    pub fn register(&mut self, name: &str, reply: &str) {
        self.registry
            .get_or_insert_with(CommandRegistry::new)
            .register(StaticReply::new(name, reply))
            .expect("instrument command names are unique");
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        let Some(registry) = self.registry.take() else {
            return;
        };

        match bootstrap_with(&*self.loader, self.reporter.clone(), registry) {
            Ok(daemon) => self.daemon = Some(daemon),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Returns whether bootstrap produced an error.
    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns the bootstrapped daemon, if any.
    #[must_use]
    pub fn daemon(&self) -> Option<&Daemon> {
        self.daemon.as_ref()
    }
}

/// Fixture-friendly constructor.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
