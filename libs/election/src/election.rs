//! Election Orchestrator
//!
//! Starts every actor of a ring concurrently, waits for the single completion
//! signal, stops the rest of the ring and collects the reports.
//!
//! Non-leader actors never return on their own. After the leader reports, the
//! orchestrator broadcasts shutdown and joins every task, so no actor outlives
//! `Election::run` and the message count it returns is final.

use crate::error::{ElectionError, Result};
use crate::identifier::ProcessId;
use crate::process::{LeaderElected, Outcome, ProcessReport};
use crate::ring::Ring;

use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Result of one complete run
#[derive(Debug, Clone)]
pub struct ElectionOutcome {
    pub leader: ProcessId,
    /// Phase the leader was in when its probe circled the ring
    pub leader_phase: u32,
    /// Messages handled by all actors together
    pub messages: u64,
    pub reports: Vec<ProcessReport>,
    pub elapsed: Duration,
}

impl ElectionOutcome {
    pub fn ring_size(&self) -> usize {
        self.reports.len()
    }
}

/// Runs a wired ring to completion
#[derive(Debug, Clone, Default)]
pub struct Election {
    timeout: Option<Duration>,
}

impl Election {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up if no leader is known within `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn run(&self, ring: Ring) -> Result<ElectionOutcome> {
        let start = Instant::now();
        let Ring {
            actors,
            shutdown,
            mut completion,
            counter,
        } = ring;

        info!(size = actors.len(), "Starting election");

        let handles: Vec<JoinHandle<Result<ProcessReport>>> = actors
            .into_iter()
            .map(|actor| tokio::spawn(actor.run()))
            .collect();

        let signal = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, completion.recv()).await {
                Ok(signal) => signal,
                Err(_) => {
                    let timeout_ms = timeout.as_millis() as u64;
                    warn!(timeout_ms, "No leader elected before the deadline, stopping ring");
                    shutdown.trigger();
                    // Reports are irrelevant here; only make sure no task outlives the run
                    let _ = join_actors(handles).await;
                    return Err(ElectionError::Timeout { timeout_ms });
                }
            },
            None => completion.recv().await,
        };

        shutdown.trigger();
        let reports = join_actors(handles).await?;

        let signal = signal.ok_or(ElectionError::NoLeader)?;
        let leader = verify_single_leader(&reports, signal)?;

        let outcome = ElectionOutcome {
            leader,
            leader_phase: signal.phase,
            messages: counter.get(),
            reports,
            elapsed: start.elapsed(),
        };

        info!(
            leader = %outcome.leader,
            phase = outcome.leader_phase,
            messages = outcome.messages,
            elapsed_us = outcome.elapsed.as_micros() as u64,
            "Election complete"
        );

        Ok(outcome)
    }
}

/// Wait for every actor, surfacing the first failure
async fn join_actors(handles: Vec<JoinHandle<Result<ProcessReport>>>) -> Result<Vec<ProcessReport>> {
    let mut reports = Vec::with_capacity(handles.len());
    let mut first_error = None;

    for joined in futures::future::join_all(handles).await {
        match joined {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(e)) => {
                error!(error = %e, category = e.category(), "Actor failed");
                first_error.get_or_insert(e);
            }
            Err(e) => {
                error!(error = %e, "Actor task could not be joined");
                first_error.get_or_insert(ElectionError::ActorPanicked {
                    message: e.to_string(),
                });
            }
        }
    }

    debug!(joined = reports.len(), "All actors joined");

    match first_error {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}

fn verify_single_leader(reports: &[ProcessReport], signal: LeaderElected) -> Result<ProcessId> {
    let leaders: Vec<ProcessId> = reports
        .iter()
        .filter(|report| report.outcome == Outcome::Leader)
        .map(|report| report.id)
        .collect();

    match leaders.as_slice() {
        [] => Err(ElectionError::NoLeader),
        [leader] if *leader == signal.leader => Ok(*leader),
        [_] => Err(ElectionError::MultipleLeaders { count: 2 }),
        many => Err(ElectionError::MultipleLeaders { count: many.len() }),
    }
}
