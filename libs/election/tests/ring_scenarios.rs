//! End-to-end ring elections
//!
//! Spawns real actor rings and checks leadership, the winning identifier, the
//! leader's final phase and the message count.

use hs_election::{
    message_bound, Election, ElectionOutcome, MessageCounter, Outcome, ProcessId, RingTopology,
};
use std::sync::Arc;
use std::time::Duration;

const DEADLINE: Duration = Duration::from_secs(10);

/// Initialize tracing for tests (call once per test)
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

fn ceil_log2(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}

async fn elect(topology: &RingTopology) -> ElectionOutcome {
    let ring = topology.build(Arc::new(MessageCounter::new()));
    Election::new()
        .with_timeout(DEADLINE)
        .run(ring)
        .await
        .expect("election should complete")
}

fn assert_valid_outcome(topology: &RingTopology, outcome: &ElectionOutcome) {
    let n = topology.len();

    assert_eq!(Some(outcome.leader), topology.max_identifier());
    assert_eq!(outcome.ring_size(), n);

    let leaders: Vec<_> = outcome
        .reports
        .iter()
        .filter(|r| r.outcome == Outcome::Leader)
        .collect();
    assert_eq!(leaders.len(), 1, "exactly one process must declare leadership");
    assert_eq!(leaders[0].id, outcome.leader);

    assert!(
        outcome.messages <= message_bound(n),
        "ring of {} handled {} messages, bound is {}",
        n,
        outcome.messages,
        message_bound(n)
    );

    let per_actor: u64 = outcome.reports.iter().map(|r| r.handled).sum();
    assert_eq!(per_actor, outcome.messages);

    // The leader's probe first circles the ring once 2^phase >= N
    assert_eq!(outcome.leader_phase, ceil_log2(n));
}

#[tokio::test]
async fn test_ring_of_one_elects_itself_with_one_message() {
    init_tracing();

    let topology = RingTopology::from_identifiers([42u64]).unwrap();
    let outcome = elect(&topology).await;

    assert_eq!(outcome.leader, ProcessId::new(42));
    assert_eq!(outcome.leader_phase, 0);
    assert_eq!(outcome.messages, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ring_of_two() {
    init_tracing();

    for ids in [[3u64, 8], [8, 3]] {
        let topology = RingTopology::from_identifiers(ids).unwrap();
        let outcome = elect(&topology).await;
        assert_valid_outcome(&topology, &outcome);
        assert_eq!(outcome.leader, ProcessId::new(8));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_ring_of_three_elects_nine_in_every_arrangement() {
    init_tracing();

    let arrangements = [
        [5u64, 1, 9],
        [5, 9, 1],
        [1, 5, 9],
        [1, 9, 5],
        [9, 5, 1],
        [9, 1, 5],
    ];

    for ids in arrangements {
        let topology = RingTopology::from_identifiers(ids).unwrap();
        let outcome = elect(&topology).await;
        assert_valid_outcome(&topology, &outcome);
        assert_eq!(outcome.leader, ProcessId::new(9));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_ring_of_eight_elects_seven_for_any_seed() {
    init_tracing();

    for seed in 0..20 {
        let topology = RingTopology::seeded(8, seed).unwrap();
        let outcome = elect(&topology).await;
        assert_valid_outcome(&topology, &outcome);
        assert_eq!(outcome.leader, ProcessId::new(7));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unique_leader_for_every_small_ring() {
    init_tracing();

    for n in 1..=32 {
        let topology = RingTopology::random(n).unwrap();
        let outcome = elect(&topology).await;
        assert_valid_outcome(&topology, &outcome);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sorted_rings_in_both_directions() {
    init_tracing();

    // Monotone arrangements push every probe the same way round the ring
    let ascending = RingTopology::from_identifiers(0u64..64).unwrap();
    let descending = RingTopology::from_identifiers((0u64..64).rev()).unwrap();

    for topology in [ascending, descending] {
        let outcome = elect(&topology).await;
        assert_valid_outcome(&topology, &outcome);
        assert_eq!(outcome.leader, ProcessId::new(63));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_large_sparse_identifiers() {
    init_tracing();

    let ids: Vec<u64> = (0..100u64).map(|i| (i * 7_919) % 1_000_003 + 1_000).collect();
    let topology = RingTopology::from_identifiers(ids.clone()).unwrap();
    let outcome = elect(&topology).await;

    assert_valid_outcome(&topology, &outcome);
    assert_eq!(outcome.leader.value(), *ids.iter().max().unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_counter_is_per_ring_and_resettable() {
    init_tracing();

    let topology = RingTopology::seeded(8, 3).unwrap();
    let counter = Arc::new(MessageCounter::new());

    let first = Election::new()
        .run(topology.build(Arc::clone(&counter)))
        .await
        .unwrap();
    assert_eq!(counter.get(), first.messages);

    counter.reset();
    assert_eq!(counter.get(), 0);

    let second = Election::new()
        .run(topology.build(Arc::clone(&counter)))
        .await
        .unwrap();
    assert_eq!(counter.get(), second.messages);
    assert!(second.messages > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rings_do_not_share_state() {
    init_tracing();

    let runs: Vec<_> = (0..4u64)
        .map(|seed| {
            tokio::spawn(async move {
                let topology = RingTopology::seeded(16, seed).unwrap();
                let outcome = elect(&topology).await;
                (topology, outcome)
            })
        })
        .collect();

    for run in runs {
        let (topology, outcome) = run.await.unwrap();
        assert_valid_outcome(&topology, &outcome);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_all_actors_stop_after_election() {
    init_tracing();

    let topology = RingTopology::seeded(12, 11).unwrap();
    let outcome = elect(&topology).await;

    let stopped = outcome
        .reports
        .iter()
        .filter(|r| r.outcome == Outcome::Stopped)
        .count();
    assert_eq!(stopped, 11);

    // No phase counter can pass the leader's
    assert!(outcome.reports.iter().all(|r| r.phase <= outcome.leader_phase));
}
