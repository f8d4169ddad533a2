//! Test helpers for the transport module.

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::{ConnectionHandler, ConnectionStream};

/// Records the first chunk each connection sends.
#[derive(Default)]
pub(crate) struct CountingHandler {
    requests: Mutex<Vec<Vec<u8>>>,
}

impl CountingHandler {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub(crate) fn requests(&self) -> Vec<Vec<u8>> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Polls until `expected` connections were handled or two seconds pass.
    pub(crate) fn wait_for(&self, expected: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if self.count() >= expected {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        let mut chunk = [0_u8; 64];
        let read = stream.read(&mut chunk).unwrap_or(0);
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(chunk[..read].to_vec());
    }
}
