//! Control service bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use radarctl_config::Config;

use crate::dispatch::{CommandRegistry, RegistryError, SessionHandler, SessionStats};
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the service configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when any configuration layer is invalid.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// A registered command clashes with a built-in.
    #[error("failed to register built-in commands: {source}")]
    Registry {
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: Config,
    registry: Arc<CommandRegistry>,
    stats: Arc<SessionStats>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The frozen registry sessions dispatch through.
    #[must_use]
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Session outcome counters shared with the `status` command.
    #[must_use]
    pub fn stats(&self) -> &Arc<SessionStats> {
        &self.stats
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Reporter used for lifecycle events.
    #[must_use]
    pub fn reporter(&self) -> &Arc<dyn HealthReporter> {
        &self.reporter
    }

    /// Builds the connection handler serving this daemon's registry.
    #[must_use]
    pub fn session_handler(&self) -> SessionHandler {
        SessionHandler::new(Arc::clone(&self.registry), Arc::clone(&self.stats))
    }
}

impl std::fmt::Debug for Daemon {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Daemon")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Bootstraps the control service using the supplied collaborators.
///
/// `registry` holds the instrument commands; the built-ins are added ahead
/// of them and the result is frozen for sharing.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration, telemetry, or built-in
/// registration fails. The reporter sees the failure
/// before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    registry: CommandRegistry,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    match bootstrap_inner(loader, Arc::clone(&reporter), registry) {
        Ok(daemon) => {
            reporter.bootstrap_succeeded(&daemon.config, daemon.registry.len());
            Ok(daemon)
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn bootstrap_inner(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    registry: CommandRegistry,
) -> Result<Daemon, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;

    let stats = Arc::new(SessionStats::new());
    let registry = registry
        .with_builtins(Arc::clone(&stats))
        .map_err(|source| BootstrapError::Registry { source })?;

    Ok(Daemon {
        config,
        registry,
        stats,
        telemetry,
        reporter,
    })
}
