//! Election Error Types
//!
//! Construction-time validation failures, link failures observed by a running
//! actor, and the consistency checks the orchestrator applies after a run.

use crate::identifier::ProcessId;
use crate::messages::Side;
use thiserror::Error;

/// Main election error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElectionError {
    /// A ring needs at least one process
    #[error("Ring must contain at least one process")]
    EmptyRing,

    /// Identifiers must be globally unique; ties have no defined winner
    #[error("Duplicate process identifier: {id}")]
    DuplicateIdentifier { id: ProcessId },

    /// A neighbor's link closed while the election was still running
    #[error("Link closed: process {process} lost its {side} neighbor before shutdown")]
    LinkClosed { process: ProcessId, side: Side },

    /// No completion signal arrived within the configured deadline
    #[error("Timeout error: election exceeded {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Every actor stopped without any of them declaring leadership
    #[error("Election finished without a leader")]
    NoLeader,

    /// More than one actor declared leadership
    #[error("Election produced {count} leaders")]
    MultipleLeaders { count: usize },

    /// An actor task could not be joined
    #[error("Actor task failed: {message}")]
    ActorPanicked { message: String },
}

impl ElectionError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyRing | Self::DuplicateIdentifier { .. } => "topology",
            Self::LinkClosed { .. } => "link",
            Self::Timeout { .. } => "timeout",
            Self::NoLeader | Self::MultipleLeaders { .. } => "consistency",
            Self::ActorPanicked { .. } => "runtime",
        }
    }
}

/// Result type for election operations
pub type Result<T> = std::result::Result<T, ElectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ElectionError::DuplicateIdentifier { id: ProcessId::new(4) };
        assert_eq!(err.to_string(), "Duplicate process identifier: 4");

        let err = ElectionError::LinkClosed {
            process: ProcessId::new(2),
            side: Side::Left,
        };
        assert!(err.to_string().contains("Left neighbor"));
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(ElectionError::EmptyRing.category(), "topology");
        assert_eq!(ElectionError::Timeout { timeout_ms: 10 }.category(), "timeout");
        assert_eq!(ElectionError::NoLeader.category(), "consistency");
    }
}
