//! Ring Messages
//!
//! The probe/reply token exchanged between neighbors, the way it is traveling
//! relative to its origin, and the two sides of a process.
//!
//! Relay rules are expressed only in terms of sides: an outbound message keeps
//! moving to the side opposite the one it arrived on, and a reflected message
//! goes back to the side it arrived from.

use crate::identifier::ProcessId;
use std::fmt;

/// One of the two ring neighbors of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, in the order probes are dispatched
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// The other neighbor
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "Left"),
            Side::Right => write!(f, "Right"),
        }
    }
}

/// Travel direction of a message relative to its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Way {
    /// Still probing away from the origin
    Outbound,
    /// Reflected, retracing the path back to the origin
    Inbound,
}

impl fmt::Display for Way {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Way::Outbound => write!(f, "Out"),
            Way::Inbound => write!(f, "In"),
        }
    }
}

/// Probe/reply token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    origin: ProcessId,
    remaining_hops: u64,
    way: Way,
}

impl Message {
    /// Hop budget of a probe sent in `phase`: 2^phase
    pub fn hop_budget(phase: u32) -> u64 {
        2u64.saturating_pow(phase)
    }

    /// Fresh outbound probe for `origin` in `phase`
    pub fn probe(origin: ProcessId, phase: u32) -> Self {
        Self {
            origin,
            remaining_hops: Self::hop_budget(phase),
            way: Way::Outbound,
        }
    }

    /// Build an arbitrary message, mostly useful in tests
    pub fn new(origin: ProcessId, remaining_hops: u64, way: Way) -> Self {
        Self {
            origin,
            remaining_hops,
            way,
        }
    }

    pub fn origin(&self) -> ProcessId {
        self.origin
    }

    pub fn remaining_hops(&self) -> u64 {
        self.remaining_hops
    }

    pub fn way(&self) -> Way {
        self.way
    }

    pub fn is_outbound(&self) -> bool {
        self.way == Way::Outbound
    }

    /// Spend one hop of an outbound probe.
    ///
    /// The result is still outbound while budget remains; once the budget is
    /// exhausted the message turns inbound and keeps zero hops from then on.
    /// Inbound messages are returned unchanged.
    pub fn relayed(self) -> Self {
        if self.way == Way::Inbound {
            return self;
        }

        let remaining_hops = self.remaining_hops.saturating_sub(1);
        let way = if remaining_hops == 0 {
            Way::Inbound
        } else {
            Way::Outbound
        };

        Self {
            origin: self.origin,
            remaining_hops,
            way,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uid={}; hops={}, way={}",
            self.origin, self.remaining_hops, self.way
        )
    }
}
