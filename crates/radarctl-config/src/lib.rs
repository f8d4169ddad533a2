//! Shared configuration for the radar control service and its clients.
//!
//! Both `radarctld` and `radarctl-probe` load the same [`Config`] through
//! `ortho_config`, which layers built-in defaults, an optional TOML file
//! (`--config-path` or `RADARCTL_CONFIG_PATH`), `RADARCTL_*` environment
//! variables, and command-line flags, in that order of precedence.
//!
//! The crate also owns the small amount of transport vocabulary the two
//! binaries must agree on: the daemon's TCP [`SocketEndpoint`] and the
//! resolution of the well-known service name into a port via a
//! [`ServiceTable`].

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod service;
mod socket;

pub use defaults::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_LISTEN_HOST, DEFAULT_LOG_FILTER, DEFAULT_SERVICE_NAME,
    DEFAULT_SERVICES_PATH, DEFAULT_TCP_PORT, default_connect_timeout_ms, default_fallback_port,
    default_log_filter, default_log_filter_string, default_log_format, default_service_name,
    default_services_path, default_socket_endpoint,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use service::{ServiceEntry, ServiceResolveError, ServiceTable, resolve_service_port};
pub use socket::{SocketEndpoint, SocketParseError};

/// Layered configuration shared by the daemon and the probe.
///
/// Every field carries an `ortho_config` default so the defaults layer is
/// complete on its own; the serde defaults cover configuration files read
/// outside the loader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "RADARCTL")]
pub struct Config {
    /// Endpoint the daemon listens on.
    #[serde(default = "defaults::default_socket_endpoint")]
    #[ortho_config(default = defaults::default_socket_endpoint())]
    pub daemon_socket: SocketEndpoint,
    /// Service name (or numeric port) the probe resolves to find the daemon.
    #[serde(
        default = "defaults::default_service_name",
        deserialize_with = "service::deserialize_service_name"
    )]
    #[ortho_config(default = defaults::default_service_name())]
    pub service_name: String,
    /// Services database consulted when resolving `service_name`.
    #[serde(default = "defaults::default_services_path")]
    #[ortho_config(default = defaults::default_services_path())]
    pub services_path: Utf8PathBuf,
    /// Port used when `service_name` is absent from the services database.
    #[serde(default = "defaults::default_fallback_port")]
    #[ortho_config(default = defaults::DEFAULT_TCP_PORT)]
    pub fallback_port: Option<u16>,
    /// Upper bound for establishing each candidate connection.
    #[serde(default = "defaults::default_connect_timeout_ms")]
    #[ortho_config(default = defaults::DEFAULT_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,
    /// Optional bound on each blocking read; unset means reads block until
    /// data or end-of-stream.
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
    /// `tracing` filter expression.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "defaults::default_log_format")]
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_socket_endpoint(),
            service_name: default_service_name(),
            services_path: default_services_path(),
            fallback_port: default_fallback_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint the daemon binds.
    #[must_use]
    pub fn daemon_socket(&self) -> &SocketEndpoint {
        &self.daemon_socket
    }

    /// Service name or numeric port used by clients.
    #[must_use]
    pub fn service_name(&self) -> &str {
        self.service_name.as_str()
    }

    /// Path to the services database.
    #[must_use]
    pub fn services_path(&self) -> &Utf8Path {
        self.services_path.as_path()
    }

    /// Port used when the service name cannot be found.
    #[must_use]
    pub fn fallback_port(&self) -> Option<u16> {
        self.fallback_port
    }

    /// Connection timeout applied to each candidate endpoint.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Read timeout, when configured. A zero value is treated as unset since
    /// the standard library rejects zero socket timeouts.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
