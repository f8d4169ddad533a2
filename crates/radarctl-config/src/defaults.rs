use camino::Utf8PathBuf;

use crate::socket::SocketEndpoint;

/// Port the daemon listens on, and the probe's fallback when the service name
/// is missing from the services database.
pub const DEFAULT_TCP_PORT: u16 = 54321;

/// Address the daemon binds by default.
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";

/// Well-known service name clients resolve.
pub const DEFAULT_SERVICE_NAME: &str = "radarctl";

/// Services database consulted during name resolution.
pub const DEFAULT_SERVICES_PATH: &str = "/etc/services";

/// Connection timeout applied per candidate endpoint.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Computes the default socket endpoint for the daemon.
pub fn default_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_LISTEN_HOST, DEFAULT_TCP_PORT)
}

/// Owned default service name.
pub fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

/// Owned default services database path.
pub fn default_services_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_SERVICES_PATH)
}

pub fn default_fallback_port() -> Option<u16> {
    Some(DEFAULT_TCP_PORT)
}

pub fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}
