//! Signal-driven shutdown for the foreground service.

use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use signal_hook::low_level::signal_name;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Signals that end the service. Configuration is only read at startup, so
/// SIGHUP stops the service rather than reloading it.
pub(crate) const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Source of the "stop now" notification.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until the service should stop.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the notification source cannot be set up.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Waits for one of [`TERMINATION_SIGNALS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl SystemShutdownSignal {
    /// Builds a signal listener.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals =
            Signals::new(TERMINATION_SIGNALS).map_err(|source| ShutdownError::Install { source })?;
        let received = signals.forever().next();
        info!(
            target: PROCESS_TARGET,
            signal = received.and_then(signal_name).unwrap_or("unknown"),
            "shutdown signal received"
        );
        Ok(())
    }
}
