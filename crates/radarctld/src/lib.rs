//! Control service for a long-running instrument controller.
//!
//! Remote clients connect over TCP, send one command name,
//! and read the command's reply until the service closes the connection. The
//! crate provides the pieces of that exchange:
//!
//! - [`Command`] is the executable unit of work. Instrument operations plug in
//!   by implementing it.
//! - [`CommandRegistry`] maps names to commands. Lookup is exact and
//!   case-sensitive; a miss is a typed [`DispatchError::UnknownCommand`].
//! - [`SessionHandler`] runs one request/response session per connection.
//! - [`SocketListener`] accepts connections and hands each to the session
//!   handler on its own thread.
//!
//! [`bootstrap_with`] wires configuration, telemetry, and the built-in
//! `health`, `status`, and `commands` commands; [`run_daemon`] serves them in
//! the foreground until a termination signal arrives.
//!
//! ```no_run
//! use radarctld::{CommandRegistry, StaticReply, run_daemon_with_commands};
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(StaticReply::new("stop", "acquisition stopped\n"))?;
//! run_daemon_with_commands(registry)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bootstrap;
pub mod builtins;
mod command;
mod dispatch;
mod health;
mod process;
pub mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use command::{Command, CommandError, StaticReply};
pub use dispatch::{
    CommandRegistry, CommandSource, DispatchError, MAX_COMMAND_BYTES, REQUEST_GRACE,
    RegistryError, SessionCounts, SessionHandler, SessionOutcome, SessionStats,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon,
    run_daemon_with_commands,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ConnectionHandler, ConnectionStream, ListenerError, SocketListener};

#[cfg(test)]
mod tests;
