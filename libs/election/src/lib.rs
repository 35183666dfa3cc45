//! Hirschberg-Sinclair Ring Election
//!
//! Asynchronous leader election on a bidirectional ring. Every process runs as
//! its own tokio task and talks only to its two neighbors over one-slot links.
//! No process knows the ring size; the process with the largest identifier is
//! elected after O(N log N) messages.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────┐  build   ┌───────────────────────────────────────────┐
//!  │ RingTopology │ ───────> │ Ring                                      │
//!  └──────────────┘          │  ┌────────┐ link ┌────────┐ link ┌──────┐ │
//!                            │  │ P[0]   │<────>│ P[1]   │<────>│ ...  │ │
//!                            │  └────────┘      └────────┘      └──────┘ │
//!                            │      ^                                 ^  │
//!                            │      └──────────── link ───────────────┘  │
//!                            └───────────────────────────────────────────┘
//!                                   │ spawn all, await leader, shutdown
//!                            ┌──────▼──────┐
//!                            │  Election   │ ──> ElectionOutcome
//!                            └─────────────┘
//! ```
//!
//! # Protocol
//!
//! In phase `k` a process sends a probe carrying its identifier and a budget of
//! `2^k` hops to both neighbors. A probe is absorbed by any process with a
//! larger identifier, reflected when its budget runs out, and relayed
//! otherwise. A process advances to the next phase once both probes return,
//! and wins when one of its probes comes back without ever being reflected.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hs_election::{Election, MessageCounter, RingTopology};
//! use std::sync::Arc;
//!
//! # async fn demo() -> hs_election::Result<()> {
//! let topology = RingTopology::from_identifiers([5u64, 1, 9])?;
//! let ring = topology.build(Arc::new(MessageCounter::new()));
//! let outcome = Election::new().run(ring).await?;
//! assert_eq!(outcome.leader.value(), 9);
//! # Ok(())
//! # }
//! ```

pub mod counter;
pub mod election;
pub mod error;
pub mod identifier;
pub mod link;
pub mod messages;
pub mod process;
pub mod ring;
pub mod shutdown;
pub mod state;

pub use counter::MessageCounter;
pub use election::{Election, ElectionOutcome};
pub use error::{ElectionError, Result};
pub use identifier::ProcessId;
pub use messages::{Message, Side, Way};
pub use process::{LeaderElected, Outcome, ProcessActor, ProcessReport};
pub use ring::{build_ring, Ring, RingTopology};
pub use shutdown::{Shutdown, ShutdownListener};
pub use state::{ProcessState, Step};

/// Upper bound on handled messages for a ring of `size` processes:
/// `8 * N * (1 + ceil(log2 N))`.
pub fn message_bound(size: usize) -> u64 {
    let n = size as u64;
    let log = if size <= 1 {
        0
    } else {
        u64::from(usize::BITS - (size - 1).leading_zeros())
    };
    8 * n * (1 + log)
}
