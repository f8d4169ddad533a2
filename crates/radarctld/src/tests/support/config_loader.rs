//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};

use radarctl_config::{Config, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

/// Loader that yields a usable configuration listening on an ephemeral
/// loopback port.
pub struct TestConfigLoader {
    endpoint: SocketEndpoint,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoint: SocketEndpoint::tcp("127.0.0.1", 0),
        }
    }

    /// The endpoint every load returns.
    #[must_use]
    pub fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            daemon_socket: self.endpoint.clone(),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("radarctld"),
            OsString::from("--daemon-socket"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}
