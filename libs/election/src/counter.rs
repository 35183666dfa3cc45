//! Message Counter
//!
//! Shared tally of messages handled by every actor of a ring. The counter is
//! handed to each actor at construction, never reached through a global.

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe count of handled messages
#[derive(Debug, Default)]
pub struct MessageCounter {
    handled: AtomicU64,
}

impl MessageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one handled message. Safe to call concurrently.
    pub fn increment(&self) {
        self.handled.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of messages handled so far.
    ///
    /// Only meaningful once every actor of the run has been joined.
    pub fn get(&self) -> u64 {
        self.handled.load(Ordering::Acquire)
    }

    /// Zero the counter between repeated runs
    pub fn reset(&self) {
        self.handled.store(0, Ordering::Release);
    }
}
