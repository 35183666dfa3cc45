//! Ring Process Actor
//!
//! Async runner for one ring position. The actor owns its `ProcessState`, its
//! two mailboxes and its two outbound links; nothing else on the ring can see
//! or mutate them.
//!
//! # Wake-up conditions
//!
//! The message loop waits on, in priority order:
//! 1. the ring-wide shutdown signal
//! 2. free space on a link that has staged messages (left, then right)
//! 3. a message in the left or right mailbox
//!
//! Only the process holding the maximum identifier ever leaves the loop on its
//! own. It triggers shutdown and reports itself to the orchestrator before
//! dropping its links, so a neighbor that sees a closed link can tell a normal
//! end of run from a lost peer.

use crate::counter::MessageCounter;
use crate::error::{ElectionError, Result};
use crate::identifier::ProcessId;
use crate::link::Port;
use crate::messages::{Message, Side};
use crate::shutdown::{Shutdown, ShutdownListener};
use crate::state::{ProcessState, Step};

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

/// Completion signal sent by the winning process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderElected {
    pub leader: ProcessId,
    pub phase: u32,
}

/// How an actor's run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Declared itself leader
    Leader,
    /// Stopped by the shutdown signal
    Stopped,
}

/// Final snapshot of one actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub id: ProcessId,
    pub phase: u32,
    pub outcome: Outcome,
    /// Messages this actor handled
    pub handled: u64,
}

/// Shared handles every actor of one ring receives
#[derive(Debug, Clone)]
pub(crate) struct RingContext {
    pub counter: Arc<MessageCounter>,
    pub shutdown: Shutdown,
    pub completion: mpsc::UnboundedSender<LeaderElected>,
}

/// Election state machine bound to its ring links
#[derive(Debug)]
pub struct ProcessActor {
    state: ProcessState,
    left: Port,
    right: Port,
    counter: Arc<MessageCounter>,
    shutdown: Shutdown,
    listener: ShutdownListener,
    completion: mpsc::UnboundedSender<LeaderElected>,
    handled: u64,
}

impl ProcessActor {
    pub(crate) fn new(id: ProcessId, left: Port, right: Port, context: &RingContext) -> Self {
        Self {
            state: ProcessState::new(id),
            left,
            right,
            counter: Arc::clone(&context.counter),
            listener: context.shutdown.subscribe(),
            shutdown: context.shutdown.clone(),
            completion: context.completion.clone(),
            handled: 0,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.state.id()
    }

    /// Run the election until this process wins or the ring shuts down
    pub async fn run(mut self) -> Result<ProcessReport> {
        debug!(process = %self.id(), "Starting process");

        let probe = self.state.current_probe();
        self.start_phase(probe);

        let outcome = loop {
            let (message, from) = tokio::select! {
                biased;

                _ = self.listener.recv() => break Outcome::Stopped,

                permit = self.left.link.reserve(), if !self.left.pending.is_empty() => {
                    match permit {
                        Some(permit) => {
                            if let Some(message) = self.left.pending.pop_front() {
                                permit.send(message);
                            }
                            continue;
                        }
                        None => break link_closed(&mut self.listener, self.state.id(), Side::Left)?,
                    }
                }

                permit = self.right.link.reserve(), if !self.right.pending.is_empty() => {
                    match permit {
                        Some(permit) => {
                            if let Some(message) = self.right.pending.pop_front() {
                                permit.send(message);
                            }
                            continue;
                        }
                        None => break link_closed(&mut self.listener, self.state.id(), Side::Right)?,
                    }
                }

                received = self.left.mailbox.recv() => match received {
                    Some(message) => (message, Side::Left),
                    None => break link_closed(&mut self.listener, self.state.id(), Side::Left)?,
                },

                received = self.right.mailbox.recv() => match received {
                    Some(message) => (message, Side::Right),
                    None => break link_closed(&mut self.listener, self.state.id(), Side::Right)?,
                },
            };

            if self.handle_message(message, from) {
                break Outcome::Leader;
            }
        };

        debug!(
            process = %self.id(),
            phase = self.state.phase(),
            outcome = ?outcome,
            handled = self.handled,
            "Process finished"
        );

        Ok(ProcessReport {
            id: self.id(),
            phase: self.state.phase(),
            outcome,
            handled: self.handled,
        })
    }

    /// Returns true once this process has declared leadership
    fn handle_message(&mut self, message: Message, from: Side) -> bool {
        self.counter.increment();
        self.handled += 1;

        trace!(process = %self.id(), from = %from, message = %message, "Received message");

        match self.state.handle(message, from) {
            Step::Elected => {
                info!(
                    process = %self.id(),
                    phase = self.state.phase(),
                    "Process {}: I am the leader!",
                    self.id()
                );
                self.shutdown.trigger();
                // The orchestrator may already have given up waiting
                let _ = self.completion.send(LeaderElected {
                    leader: self.id(),
                    phase: self.state.phase(),
                });
                true
            }
            Step::Absorbed | Step::TokenReturned => false,
            Step::Relay { to, message } => {
                self.port_mut(to).stage(message);
                false
            }
            Step::NextPhase { probe, .. } => {
                self.start_phase(probe);
                false
            }
        }
    }

    /// Stage the phase's probe towards both neighbors without waiting on either link
    fn start_phase(&mut self, probe: Message) {
        debug!(
            process = %self.id(),
            phase = self.state.phase(),
            hops = probe.remaining_hops(),
            "Starting election phase"
        );
        for side in Side::BOTH {
            self.port_mut(side).stage(probe);
        }
    }

    fn port_mut(&mut self, side: Side) -> &mut Port {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// A neighbor went away: normal after shutdown, an error before it
fn link_closed(listener: &mut ShutdownListener, process: ProcessId, side: Side) -> Result<Outcome> {
    if listener.is_signaled() {
        return Ok(Outcome::Stopped);
    }

    Err(ElectionError::LinkClosed { process, side })
}
