//! The capability shared by every executable control command.
//!
//! A command is identified by a case-sensitive name and executes against an
//! output sink. Output is written as it is produced; the session layer streams
//! it to the peer and closes the connection when `execute` returns, which is
//! the only end-of-reply signal the protocol has.

use std::io::{self, Write};

use thiserror::Error;

/// Executable unit of work registered with the
/// [`CommandRegistry`](crate::CommandRegistry).
///
/// Commands are shared between the registry and every in-flight session, so
/// implementations must be `Send + Sync`. Any state mutated during `execute`
/// needs its own synchronisation; the registry only guarantees safe concurrent
/// lookup.
pub trait Command: Send + Sync {
    /// Unique, case-sensitive name clients send to invoke the command.
    fn name(&self) -> &str;

    /// Runs the command, writing any reply bytes to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the action fails or the reply cannot be
    /// written. Output already written stays on the wire.
    fn execute(&self, output: &mut dyn Write) -> Result<(), CommandError>;
}

/// Failures raised while executing a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Writing the reply failed.
    #[error("failed to write command output: {0}")]
    Io(#[from] io::Error),
    /// Serialising a structured reply failed.
    #[error("failed to serialise command output: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The command ran but could not complete its action.
    #[error("{message}")]
    Failed { message: String },
}

impl CommandError {
    /// Creates a failure carrying a human-readable message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Command that replies with a fixed byte sequence.
///
/// Useful for simple acknowledgements and as a building block in tests.
#[derive(Debug, Clone)]
pub struct StaticReply {
    name: String,
    reply: Vec<u8>,
}

impl StaticReply {
    /// Creates a command named `name` that writes `reply` when executed.
    pub fn new(name: impl Into<String>, reply: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            reply: reply.into(),
        }
    }
}

impl Command for StaticReply {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, output: &mut dyn Write) -> Result<(), CommandError> {
        output.write_all(&self.reply)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_reply_writes_exact_bytes() {
        let command = StaticReply::new("ping", b"pong\0\n".to_vec());
        let mut output = Vec::new();
        command.execute(&mut output).expect("execute");
        assert_eq!(command.name(), "ping");
        assert_eq!(output, b"pong\0\n");
    }

    #[test]
    fn failed_error_displays_message() {
        let error = CommandError::failed("acquisition not configured");
        assert_eq!(error.to_string(), "acquisition not configured");
    }
}
