//! Error types for command lookup and session dispatch failures.
//!
//! Each variant maps to one failure mode of a control session. Request
//! problems (unknown, empty, malformed, oversized commands) are caller errors:
//! the session reports them on the wire and the service keeps running.
//! Transport errors abort only the session that hit them.

use std::io;

use thiserror::Error;

use crate::command::CommandError;

/// Errors surfaced while reading, resolving, or executing a command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No registered command has the requested name.
    #[error("unknown command '{name}'")]
    UnknownCommand { name: String },

    /// The peer sent only whitespace or delimiters.
    #[error("empty command request")]
    EmptyRequest,

    /// The command token is not valid UTF-8.
    #[error("malformed command request: {message}")]
    MalformedRequest { message: String },

    /// The command token exceeds the maximum allowed size.
    #[error("command request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge { size: usize, max_size: usize },

    /// The command itself failed.
    #[error("command failed: {0}")]
    Command(#[from] CommandError),

    /// IO error while reading the request or writing the reply.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DispatchError {
    /// Returns true for failures caused by the request rather than the
    /// service or the transport.
    #[must_use]
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCommand { .. }
                | Self::EmptyRequest
                | Self::MalformedRequest { .. }
                | Self::RequestTooLarge { .. }
        )
    }

    /// Creates an unknown command error.
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    /// Creates a malformed request error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    /// Creates a request too large error.
    pub fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }
}
