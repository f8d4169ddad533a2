//! Error types for socket listener operations.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or running the control listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The configured TCP host could not be resolved.
    #[error("failed to resolve listen address {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// The configured TCP host resolved to nothing.
    #[error("listen address {endpoint} resolved to no addresses")]
    NoAddresses { endpoint: String },
    /// Every resolved address refused the bind; `addr` is the last one tried.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to switch listener to non-blocking mode: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn the accept thread: {source}")]
    SpawnAcceptLoop {
        #[source]
        source: io::Error,
    },
    /// The accept loop panicked.
    #[error("listener thread panicked")]
    ThreadPanic,
}
