//! Per-Process Election State
//!
//! The synchronous half of a ring process: given one message and the side it
//! arrived on, decide what happens next. The async actor in `process` only
//! moves messages between links and this state machine.
//!
//! | origin  | way      | outcome                                            |
//! |---------|----------|----------------------------------------------------|
//! | self    | Outbound | probe circled the whole ring: `Elected`            |
//! | self    | Inbound  | own probe came home: `TokenReturned`/`NextPhase`   |
//! | smaller | Outbound | `Absorbed`                                         |
//! | larger  | Outbound | spend a hop, continue or reflect: `Relay`          |
//! | other   | Inbound  | pass through to the opposite side: `Relay`         |

use crate::identifier::ProcessId;
use crate::messages::{Message, Side, Way};
use tracing::{debug, trace};

/// What the actor must do after handling one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// This process holds the maximum identifier
    Elected,
    /// A foreign probe from a smaller identifier was dropped
    Absorbed,
    /// Forward `message` to the neighbor on side `to`
    Relay { to: Side, message: Message },
    /// One own probe returned; still waiting for the other side
    TokenReturned,
    /// Both own probes returned; send `probe` to both neighbors
    NextPhase { phase: u32, probe: Message },
}

/// Mutable election record owned by exactly one actor
#[derive(Debug, Clone)]
pub struct ProcessState {
    id: ProcessId,
    phase: u32,
    left_token_returned: bool,
    right_token_returned: bool,
}

impl ProcessState {
    pub fn new(id: ProcessId) -> Self {
        Self {
            id,
            phase: 0,
            left_token_returned: false,
            right_token_returned: false,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Current election phase; only ever increases
    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn token_returned(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_token_returned,
            Side::Right => self.right_token_returned,
        }
    }

    /// Probe sent to each neighbor at the start of the current phase
    pub fn current_probe(&self) -> Message {
        Message::probe(self.id, self.phase)
    }

    /// Apply one message received from the neighbor on side `from`
    pub fn handle(&mut self, message: Message, from: Side) -> Step {
        if message.origin() == self.id {
            return match message.way() {
                Way::Outbound => Step::Elected,
                Way::Inbound => self.handle_returning_token(from),
            };
        }

        match message.way() {
            Way::Outbound => self.handle_foreign_probe(message, from),
            Way::Inbound => {
                trace!(
                    process = %self.id,
                    from = %from,
                    message = %message,
                    "Passing inbound message through"
                );
                Step::Relay {
                    to: from.opposite(),
                    message,
                }
            }
        }
    }

    fn handle_returning_token(&mut self, from: Side) -> Step {
        debug!(process = %self.id, side = %from, phase = self.phase, "Token came back");

        match from {
            Side::Left => self.left_token_returned = true,
            Side::Right => self.right_token_returned = true,
        }

        if !(self.left_token_returned && self.right_token_returned) {
            return Step::TokenReturned;
        }

        self.phase += 1;
        self.left_token_returned = false;
        self.right_token_returned = false;

        debug!(
            process = %self.id,
            phase = self.phase,
            "Both probes completed the round trip, starting next phase"
        );

        Step::NextPhase {
            phase: self.phase,
            probe: self.current_probe(),
        }
    }

    fn handle_foreign_probe(&self, message: Message, from: Side) -> Step {
        if message.origin() < self.id {
            debug!(
                process = %self.id,
                origin = %message.origin(),
                "Absorbing probe from smaller identifier"
            );
            return Step::Absorbed;
        }

        let message = message.relayed();
        let to = if message.is_outbound() {
            from.opposite()
        } else {
            from
        };

        trace!(
            process = %self.id,
            from = %from,
            to = %to,
            message = %message,
            "Relaying probe"
        );

        Step::Relay { to, message }
    }
}
