//! Sequences bootstrap, listener startup, and shutdown.

use std::sync::Arc;

use tracing::info;

use radarctl_config::SocketEndpoint;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::CommandRegistry;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::{ListenerHandle, SocketListener};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to run the control service.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) registry: CommandRegistry,
    pub(crate) shutdown: S,
}

/// Runs the control service with only the built-in commands.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, listener startup, or signal
/// installation fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with_commands(CommandRegistry::new())
}

/// Runs the control service serving `registry` alongside the built-ins.
///
/// Blocks in the foreground until a termination signal arrives.
///
/// # Errors
///
/// See [`run_daemon`].
pub fn run_daemon_with_commands(registry: CommandRegistry) -> Result<(), LaunchError> {
    run_daemon_with(LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        registry,
        shutdown: SystemShutdownSignal::new(),
    })
}

/// Runs the control service with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        registry,
        shutdown,
    } = plan;

    info!(target: PROCESS_TARGET, "starting control service");
    let daemon = bootstrap_with(&loader, Arc::clone(&reporter), registry)?;
    let listener = SocketListener::bind(daemon.config().daemon_socket())?;
    let endpoint = bound_endpoint(&listener);
    let handle = listener.start(Arc::new(daemon.session_handler()))?;
    reporter.listener_ready(&endpoint);

    let waited = shutdown.wait();
    stop(handle)?;
    waited?;
    reporter.shutdown_complete();
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}

fn stop(handle: ListenerHandle) -> Result<(), LaunchError> {
    handle.shutdown();
    handle.join()?;
    Ok(())
}

/// The endpoint actually bound; differs from the configured one for port 0.
fn bound_endpoint(listener: &SocketListener) -> SocketEndpoint {
    match listener.local_addr() {
        Some(addr) => SocketEndpoint::tcp(addr.ip().to_string(), addr.port()),
        None => listener.endpoint().clone(),
    }
}
