//! Ring-wide shutdown signal
//!
//! Once a leader is known every other actor is still parked on its mailboxes.
//! The signal is a `broadcast` channel so each actor can wait on it in the same
//! `select!` as its two mailboxes.

use tokio::sync::broadcast;
use tracing::debug;

/// Sending half, cloned into every actor and kept by the orchestrator
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// New listener; must be created before `trigger` to observe it
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }

    /// Wake every listener. Calling it more than once is harmless.
    pub fn trigger(&self) {
        // Err only means nobody is listening any more
        let listeners = self.sender.send(()).unwrap_or(0);
        debug!(listeners, "Shutdown signal broadcast");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half owned by one actor
#[derive(Debug)]
pub struct ShutdownListener {
    receiver: broadcast::Receiver<()>,
}

impl ShutdownListener {
    /// Resolve once shutdown is signaled or every sender is gone
    pub async fn recv(&mut self) {
        // Lagged, Closed and Ok all mean the run is over
        let _ = self.receiver.recv().await;
    }

    /// Non-blocking check
    pub fn is_signaled(&mut self) -> bool {
        !matches!(
            self.receiver.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_all_listeners() {
        let shutdown = Shutdown::new();
        let mut first = shutdown.subscribe();
        let mut second = shutdown.subscribe();

        assert!(!first.is_signaled());

        shutdown.trigger();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), first.recv())
            .await
            .unwrap();
        assert!(second.is_signaled());
    }

    #[tokio::test]
    async fn test_dropped_sender_counts_as_shutdown() {
        let shutdown = Shutdown::new();
        let mut listener = shutdown.subscribe();
        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), listener.recv())
            .await
            .unwrap();
    }
}
