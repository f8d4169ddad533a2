//! Error types for the probe runtime.

use std::io;
use std::sync::Arc;

use radarctl_config::ServiceResolveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to resolve service '{service}': {source}")]
    UnknownService {
        service: String,
        #[source]
        source: ServiceResolveError,
    },
    #[error("failed to resolve address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("no addresses found for {endpoint}")]
    NoCandidates { endpoint: String },
    #[error("failed to connect to {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[error("failed to configure connection: {0}")]
    ConfigureStream(io::Error),
    #[error("failed to send command: {0}")]
    SendRequest(io::Error),
    #[error("failed to read reply: {0}")]
    ReadResponse(io::Error),
    #[error("failed to forward reply: {0}")]
    ForwardResponse(io::Error),
}

impl AppError {
    /// Returns true for failures that happen while probing the service, as
    /// opposed to invoking the probe incorrectly.
    pub(crate) fn is_probe_failure(&self) -> bool {
        !matches!(self, Self::LoadConfiguration(_) | Self::CliUsage(_))
    }
}
