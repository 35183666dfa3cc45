//! Repeated-run harness
//!
//! Runs the election `runs` times on rings of the configured size, one fresh
//! arrangement per run, and aggregates the message counts.

use crate::config::SimulationConfig;
use anyhow::{Context, Result};
use hs_election::{message_bound, Election, MessageCounter, ProcessId, RingTopology};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// One completed election
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub run: usize,
    pub seed: Option<u64>,
    pub leader: ProcessId,
    pub leader_phase: u32,
    pub messages: u64,
    pub elapsed: Duration,
}

/// Aggregate over all runs of one simulation
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub ring_size: usize,
    pub records: Vec<RunRecord>,
}

impl RunStatistics {
    pub fn min_messages(&self) -> u64 {
        self.records.iter().map(|r| r.messages).min().unwrap_or(0)
    }

    pub fn max_messages(&self) -> u64 {
        self.records.iter().map(|r| r.messages).max().unwrap_or(0)
    }

    pub fn mean_messages(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let total: u64 = self.records.iter().map(|r| r.messages).sum();
        total as f64 / self.records.len() as f64
    }

    pub fn mean_elapsed(&self) -> Duration {
        if self.records.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.records.iter().map(|r| r.elapsed).sum();
        total / self.records.len() as u32
    }

    /// N * log2(N), the growth rate the counts should track
    pub fn reference_scale(&self) -> f64 {
        let n = self.ring_size as f64;
        if n <= 1.0 {
            1.0
        } else {
            n * n.log2()
        }
    }

    /// Mean messages divided by N * log2(N)
    pub fn mean_ratio(&self) -> f64 {
        self.mean_messages() / self.reference_scale()
    }

    /// Proven worst-case bound for this ring size
    pub fn upper_bound(&self) -> u64 {
        message_bound(self.ring_size)
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ring size: {}", self.ring_size)?;
        writeln!(f, "Runs: {}", self.records.len())?;
        writeln!(
            f,
            "Messages: min={} max={} mean={:.1}",
            self.min_messages(),
            self.max_messages(),
            self.mean_messages()
        )?;
        writeln!(
            f,
            "Mean / (N log2 N): {:.3} (worst-case bound {})",
            self.mean_ratio(),
            self.upper_bound()
        )?;
        write!(f, "Mean election time: {:?}", self.mean_elapsed())
    }
}

/// Run every configured election and collect the results
pub async fn run_simulation(config: &SimulationConfig) -> Result<RunStatistics> {
    config.validate()?;

    let counter = Arc::new(MessageCounter::new());
    let mut election = Election::new();
    if let Some(timeout) = config.election_timeout() {
        election = election.with_timeout(timeout);
    }

    let mut records = Vec::with_capacity(config.runs);

    for run in 0..config.runs {
        let seed = config.seed_for_run(run);
        let topology = match seed {
            Some(seed) => RingTopology::seeded(config.ring_size, seed),
            None => RingTopology::random(config.ring_size),
        }
        .context("Failed to build ring topology")?;

        debug!(run, seed = ?seed, "Starting run");

        counter.reset();
        let outcome = election
            .run(topology.build(Arc::clone(&counter)))
            .await
            .with_context(|| format!("Election run {} failed", run))?;

        info!(
            run,
            leader = %outcome.leader,
            messages = outcome.messages,
            "Run finished"
        );

        records.push(RunRecord {
            run,
            seed,
            leader: outcome.leader,
            leader_phase: outcome.leader_phase,
            messages: outcome.messages,
            elapsed: outcome.elapsed,
        });
    }

    Ok(RunStatistics {
        ring_size: config.ring_size,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(messages: u64, elapsed_ms: u64) -> RunRecord {
        RunRecord {
            run: 0,
            seed: None,
            leader: ProcessId::new(0),
            leader_phase: 0,
            messages,
            elapsed: Duration::from_millis(elapsed_ms),
        }
    }

    #[test]
    fn test_statistics_aggregate() {
        let stats = RunStatistics {
            ring_size: 8,
            records: vec![record(40, 2), record(60, 4), record(50, 6)],
        };

        assert_eq!(stats.min_messages(), 40);
        assert_eq!(stats.max_messages(), 60);
        assert!((stats.mean_messages() - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.mean_elapsed(), Duration::from_millis(4));
        assert!((stats.reference_scale() - 24.0).abs() < 1e-9);
        assert_eq!(stats.upper_bound(), 256);

        let rendered = stats.to_string();
        assert!(rendered.contains("min=40 max=60 mean=50.0"));
    }

    #[test]
    fn test_empty_statistics() {
        let stats = RunStatistics {
            ring_size: 1,
            records: Vec::new(),
        };
        assert_eq!(stats.min_messages(), 0);
        assert_eq!(stats.mean_messages(), 0.0);
        assert_eq!(stats.mean_elapsed(), Duration::ZERO);
        assert_eq!(stats.reference_scale(), 1.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_seeded_simulation_is_reproducible() {
        let config = SimulationConfig {
            ring_size: 16,
            runs: 3,
            seed: Some(42),
            election_timeout_ms: Some(10_000),
            ..Default::default()
        };

        let stats = run_simulation(&config).await.unwrap();
        assert_eq!(stats.records.len(), 3);
        assert!(stats.records.iter().all(|r| r.leader == ProcessId::new(15)));
        assert!(stats.records.iter().all(|r| r.leader_phase == 4));
        assert!(stats.max_messages() <= stats.upper_bound());

        let seeds: Vec<_> = stats.records.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![Some(42), Some(43), Some(44)]);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let config = SimulationConfig {
            ring_size: 0,
            ..Default::default()
        };
        assert!(run_simulation(&config).await.is_err());
    }
}
