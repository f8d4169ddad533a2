//! Connection handler that runs one control session per connection.
//!
//! A session reads a single command token, resolves it through the shared
//! [`CommandRegistry`], streams the command's output back, and closes the
//! connection. Closing is the only end-of-reply signal the protocol has.

use std::io::Write;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::transport::{ConnectionHandler, ConnectionStream};

use super::errors::DispatchError;
use super::registry::CommandRegistry;
use super::request::{CommandSource, read_command};
use super::stats::SessionStats;
use super::SESSION_TARGET;

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The peer closed the connection without sending a command.
    Idle,
    /// The named command ran to completion.
    Served {
        /// Name of the executed command.
        command: String,
    },
    /// The request was rejected before any command ran.
    Rejected(DispatchError),
    /// The command or the transport failed.
    Failed(DispatchError),
}

/// Serves control sessions against a shared registry.
#[derive(Debug, Clone)]
pub struct SessionHandler {
    registry: Arc<CommandRegistry>,
    stats: Arc<SessionStats>,
}

impl SessionHandler {
    /// Creates a handler dispatching through `registry` and recording outcomes
    /// in `stats`.
    #[must_use]
    pub fn new(registry: Arc<CommandRegistry>, stats: Arc<SessionStats>) -> Self {
        Self { registry, stats }
    }

    /// Runs one session over `stream` without closing it.
    ///
    /// Request errors are written back as a single `error: ...` line. Errors
    /// never propagate past the session.
    pub fn serve<S>(&self, stream: &mut S) -> SessionOutcome
    where
        S: CommandSource + Write,
    {
        let token = match read_command(stream) {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!(target: SESSION_TARGET, "client disconnected without a command");
                return SessionOutcome::Idle;
            }
            Err(error) => return self.reject(stream, error),
        };

        let command = match self.registry.find(&token) {
            Ok(command) => command,
            Err(error) => return self.reject(stream, error),
        };

        debug!(target: SESSION_TARGET, command = %token, "executing command");
        match command.execute(stream) {
            Ok(()) => {
                self.stats.record_served();
                SessionOutcome::Served { command: token }
            }
            Err(error) => {
                let error = DispatchError::from(error);
                warn!(target: SESSION_TARGET, command = %token, %error, "command failed");
                write_error_line(stream, &error);
                self.stats.record_failed();
                SessionOutcome::Failed(error)
            }
        }
    }

    fn reject<S: Write>(&self, stream: &mut S, error: DispatchError) -> SessionOutcome {
        if !error.is_request_error() {
            warn!(target: SESSION_TARGET, %error, "failed to read command");
            self.stats.record_failed();
            return SessionOutcome::Failed(error);
        }

        warn!(target: SESSION_TARGET, %error, "rejected command request");
        if matches!(error, DispatchError::UnknownCommand { .. }) {
            self.stats.record_unknown();
        } else {
            self.stats.record_failed();
        }
        write_error_line(stream, &error);
        SessionOutcome::Rejected(error)
    }
}

impl ConnectionHandler for SessionHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        let outcome = self.serve(&mut stream);
        debug!(target: SESSION_TARGET, ?outcome, "session finished");
        close(&mut stream);
    }
}

/// Best-effort error report; the connection may already be gone.
fn write_error_line<S: Write>(stream: &mut S, error: &DispatchError) {
    if let Err(write_error) = writeln!(stream, "error: {error}") {
        debug!(
            target: SESSION_TARGET,
            error = %write_error,
            "failed to report session error"
        );
    }
}

fn close(stream: &mut ConnectionStream) {
    if let Err(error) = stream.flush() {
        debug!(target: SESSION_TARGET, %error, "failed to flush session output");
    }
    if let Err(error) = stream.shutdown_write() {
        debug!(target: SESSION_TARGET, %error, "failed to shut down session stream");
    }
}
