//! Ring Links
//!
//! A link is a one-slot FIFO conduit from a process to one neighbor's inbound
//! mailbox. A second message cannot enter the link until the neighbor has
//! taken the first.
//!
//! Each actor fronts its two outbound links with a local `Port` queue. Sends
//! are staged there and drained from inside the actor's `select!`, so a full
//! link never stops the actor from receiving. Without this, two neighbors
//! relaying into each other's full mailboxes would block forever, and a phase
//! start could block against the actor's own unread mailbox.

use crate::messages::Message;
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// Messages a link holds before the sender must wait
pub const LINK_CAPACITY: usize = 1;

/// Create a connected link/mailbox pair
pub fn link() -> (Link, Mailbox) {
    let (sender, receiver) = mpsc::channel(LINK_CAPACITY);
    (Link { sender }, Mailbox { receiver })
}

/// Outbound end of a link
#[derive(Debug, Clone)]
pub struct Link {
    sender: mpsc::Sender<Message>,
}

impl Link {
    /// Wait for the slot to free up
    pub async fn reserve(&self) -> Option<mpsc::Permit<'_, Message>> {
        self.sender.reserve().await.ok()
    }

    /// Deliver now if the slot is free, otherwise hand the message back
    pub fn try_deliver(&self, message: Message) -> Result<(), Message> {
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(message) => message,
            mpsc::error::TrySendError::Closed(message) => message,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Inbound end of a link
#[derive(Debug)]
pub struct Mailbox {
    receiver: mpsc::Receiver<Message>,
}

impl Mailbox {
    /// Next message in send order; `None` once the sender is gone
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }
}

/// One side of a process: the mailbox it reads and the link it writes,
/// plus the staged messages not yet accepted by the link.
#[derive(Debug)]
pub struct Port {
    pub(crate) mailbox: Mailbox,
    pub(crate) link: Link,
    pub(crate) pending: VecDeque<Message>,
}

impl Port {
    pub fn new(mailbox: Mailbox, link: Link) -> Self {
        Self {
            mailbox,
            link,
            pending: VecDeque::new(),
        }
    }

    /// Stage a message behind any already waiting, preserving FIFO order
    pub fn stage(&mut self, message: Message) {
        if self.pending.is_empty() {
            if let Err(message) = self.link.try_deliver(message) {
                self.pending.push_back(message);
            }
        } else {
            self.pending.push_back(message);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
