//! Ring Topology
//!
//! Identifier assignment and neighbor wiring. This is the only place that knows
//! the ring size or where a process sits; actors only ever see their two links.
//!
//! ```text
//!            left link                    right link
//!   P[i-1] <─────────── P[i] ───────────> P[i+1]
//!   (right mailbox)                       (left mailbox)
//! ```
//!
//! A message a process sends to its left neighbor therefore arrives in that
//! neighbor's right mailbox, and vice versa.

use crate::counter::MessageCounter;
use crate::error::{ElectionError, Result};
use crate::identifier::ProcessId;
use crate::link::{link, Link, Mailbox, Port};
use crate::process::{LeaderElected, ProcessActor, RingContext};
use crate::shutdown::Shutdown;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Identifiers in cyclic order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingTopology {
    identifiers: Vec<ProcessId>,
}

impl RingTopology {
    /// Use the given identifiers in the given order.
    ///
    /// Fails on an empty ring or on any repeated identifier.
    pub fn from_identifiers<I, T>(identifiers: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<ProcessId>,
    {
        let identifiers: Vec<ProcessId> = identifiers.into_iter().map(Into::into).collect();

        if identifiers.is_empty() {
            return Err(ElectionError::EmptyRing);
        }

        let mut seen = HashSet::with_capacity(identifiers.len());
        for id in &identifiers {
            if !seen.insert(*id) {
                return Err(ElectionError::DuplicateIdentifier { id: *id });
            }
        }

        Ok(Self { identifiers })
    }

    /// Random arrangement of identifiers `0..size`
    pub fn random(size: usize) -> Result<Self> {
        Self::shuffled(size, &mut rand::thread_rng())
    }

    /// Reproducible arrangement of identifiers `0..size`
    pub fn seeded(size: usize, seed: u64) -> Result<Self> {
        Self::shuffled(size, &mut StdRng::seed_from_u64(seed))
    }

    /// Arrangement of identifiers `0..size` drawn from `rng`
    pub fn shuffled<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self> {
        let mut identifiers: Vec<ProcessId> = (0..size as u64).map(ProcessId::new).collect();
        identifiers.shuffle(rng);
        Self::from_identifiers(identifiers)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn identifiers(&self) -> &[ProcessId] {
        &self.identifiers
    }

    /// The identifier the election must select
    pub fn max_identifier(&self) -> Option<ProcessId> {
        self.identifiers.iter().copied().max()
    }

    /// (left, right) neighbor positions of position `index`
    pub fn neighbors(&self, index: usize) -> (usize, usize) {
        let n = self.identifiers.len();
        ((index + n - 1) % n, (index + 1) % n)
    }

    /// Wire one actor per identifier. `counter` is shared by all of them.
    pub fn build(&self, counter: Arc<MessageCounter>) -> Ring {
        let n = self.identifiers.len();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let context = RingContext {
            counter: Arc::clone(&counter),
            shutdown: Shutdown::new(),
            completion: completion_tx,
        };

        // Inbound mailboxes of every position and the links that feed them
        let (left_links, left_mailboxes): (Vec<Link>, Vec<Mailbox>) = (0..n).map(|_| link()).unzip();
        let (right_links, right_mailboxes): (Vec<Link>, Vec<Mailbox>) = (0..n).map(|_| link()).unzip();

        let actors = left_mailboxes
            .into_iter()
            .zip(right_mailboxes)
            .enumerate()
            .map(|(index, (left_mailbox, right_mailbox))| {
                let (left_index, right_index) = self.neighbors(index);
                let id = self.identifiers[index];

                debug!(
                    process = %id,
                    left = %self.identifiers[left_index],
                    right = %self.identifiers[right_index],
                    "Connecting process to its neighbors"
                );

                // Sending left lands in the left neighbor's right mailbox
                let left = Port::new(left_mailbox, right_links[left_index].clone());
                let right = Port::new(right_mailbox, left_links[right_index].clone());

                ProcessActor::new(id, left, right, &context)
            })
            .collect();

        info!(size = n, "Ring built");

        Ring {
            actors,
            shutdown: context.shutdown,
            completion: completion_rx,
            counter,
        }
    }
}

/// Wired ring ready to run
#[derive(Debug)]
pub struct Ring {
    pub(crate) actors: Vec<ProcessActor>,
    pub(crate) shutdown: Shutdown,
    pub(crate) completion: mpsc::UnboundedReceiver<LeaderElected>,
    pub(crate) counter: Arc<MessageCounter>,
}

impl Ring {
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn actors(&self) -> &[ProcessActor] {
        &self.actors
    }

    pub fn counter(&self) -> Arc<MessageCounter> {
        Arc::clone(&self.counter)
    }

    /// Take the actors out to drive them manually.
    ///
    /// The returned `Shutdown` stops them and the receiver yields the leader.
    pub fn into_parts(
        self,
    ) -> (
        Vec<ProcessActor>,
        Shutdown,
        mpsc::UnboundedReceiver<LeaderElected>,
    ) {
        (self.actors, self.shutdown, self.completion)
    }
}

/// Random ring of `size` processes with identifiers `0..size`
pub fn build_ring(size: usize, counter: Arc<MessageCounter>) -> Result<Ring> {
    Ok(RingTopology::random(size)?.build(counter))
}
