//! Counters describing how control sessions ended.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free session outcome counters shared by every session thread.
#[derive(Debug, Default)]
pub struct SessionStats {
    served: AtomicU64,
    unknown: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounts {
    /// Sessions whose command ran to completion.
    pub served: u64,
    /// Sessions that named an unregistered command.
    pub unknown: u64,
    /// Sessions that ended with any other error.
    pub failed: u64,
}

impl SessionStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_served(&self) {
        self.served.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unknown(&self) {
        self.unknown.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> SessionCounts {
        SessionCounts {
            served: self.served.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
