//! Process Identifiers
//!
//! Every process on the ring carries one `ProcessId`. The same value is the
//! process's identity and the key compared when a probe is absorbed.

use std::fmt;

/// Unique, totally ordered process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(u64);

impl ProcessId {
    /// Create identifier from a raw value
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for ProcessId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
