//! Test double for [`HealthReporter`] that records lifecycle events.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use radarctl_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed with the given number of registered commands.
    BootstrapSucceeded { commands: usize },
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// The listener is accepting on the bound endpoint.
    ListenerReady(SocketEndpoint),
    /// The service stopped.
    ShutdownComplete,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }

    /// Polls until the listener reports its endpoint.
    pub fn wait_for_listener(&self, timeout: Duration) -> Option<SocketEndpoint> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let ready = self.events().into_iter().find_map(|event| match event {
                HealthEvent::ListenerReady(endpoint) => Some(endpoint),
                _ => None,
            });
            if ready.is_some() {
                return ready;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        None
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config, commands: usize) {
        self.record(HealthEvent::BootstrapSucceeded { commands });
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_ready(&self, endpoint: &SocketEndpoint) {
        self.record(HealthEvent::ListenerReady(endpoint.clone()));
    }

    fn shutdown_complete(&self) {
        self.record(HealthEvent::ShutdownComplete);
    }
}
