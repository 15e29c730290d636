//! Dispatcher admission-control properties.
//!
//! The unit tests beside the implementation cover the individual rules;
//! these drive longer arrival sequences and check the global invariants:
//! bounded running count, bounded queue, eviction iff strictly higher
//! priority, FIFO within a level.

use hostnet::dns::{Admission, PrioritizedDispatcher, RequestPriority};

const PRIORITIES: [RequestPriority; 6] = [
    RequestPriority::Throttled,
    RequestPriority::Idle,
    RequestPriority::Lowest,
    RequestPriority::Low,
    RequestPriority::Medium,
    RequestPriority::Highest,
];

/// Tiny deterministic generator so the sequence is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn test_bounds_hold_for_any_arrival_sequence() {
    let max_running = 3;
    let max_queued = 5;
    let mut d = PrioritizedDispatcher::new(max_running, max_queued);
    let mut rng = Lcg(0x5eed);

    let mut submitted = 0u64;
    for step in 0..10_000u64 {
        if rng.next() % 3 == 0 && d.running() > 0 {
            let _ = d.complete();
        } else {
            let priority = PRIORITIES[(rng.next() % 6) as usize];
            submitted += 1;
            match d.submit(step, priority) {
                Admission::Admitted
                | Admission::Queued(_)
                | Admission::Displaced { .. }
                | Admission::Rejected => {}
            }
        }
        assert!(d.running() <= max_running, "running bound violated");
        assert!(d.queued_len() <= max_queued, "queue bound violated");
    }
    assert!(submitted > 0);
}

#[test]
fn test_eviction_iff_strictly_higher_than_queued_minimum() {
    for arriving in PRIORITIES {
        for queued in PRIORITIES {
            let mut d = PrioritizedDispatcher::new(1, 1);
            assert!(matches!(
                d.submit("running", RequestPriority::Medium),
                Admission::Admitted
            ));
            d.submit("queued", queued);

            let outcome = d.submit("arriving", arriving);
            if arriving > queued {
                assert!(
                    matches!(outcome, Admission::Displaced { victim, .. } if victim == "queued"),
                    "{arriving:?} over {queued:?} should displace"
                );
            } else {
                assert!(
                    matches!(outcome, Admission::Rejected),
                    "{arriving:?} over {queued:?} should be rejected"
                );
            }
        }
    }
}

#[test]
fn test_admission_order_is_priority_then_fifo() {
    let mut d = PrioritizedDispatcher::new(1, 16);
    assert!(matches!(
        d.submit(("running", 0), RequestPriority::Medium),
        Admission::Admitted
    ));

    // Interleave two levels.
    d.submit(("low", 1), RequestPriority::Low);
    d.submit(("high", 1), RequestPriority::Highest);
    d.submit(("low", 2), RequestPriority::Low);
    d.submit(("high", 2), RequestPriority::Highest);
    d.submit(("low", 3), RequestPriority::Low);

    let order: Vec<(&str, i32)> =
        std::iter::from_fn(|| d.complete().map(|(item, _)| item)).collect();
    assert_eq!(
        order,
        [("high", 1), ("high", 2), ("low", 1), ("low", 2), ("low", 3)]
    );
}

#[test]
fn test_no_starvation_without_higher_arrivals() {
    // A queued low-priority job is admitted once the jobs ahead of it
    // complete and nothing more urgent keeps arriving.
    let mut d = PrioritizedDispatcher::new(1, 4);
    assert!(matches!(
        d.submit("running", RequestPriority::Medium),
        Admission::Admitted
    ));
    d.submit("low", RequestPriority::Throttled);
    d.submit("medium-1", RequestPriority::Medium);
    d.submit("medium-2", RequestPriority::Medium);

    let mut admitted = Vec::new();
    while let Some((item, _)) = d.complete() {
        admitted.push(item);
    }
    assert_eq!(admitted.last(), Some(&"low"));
    assert_eq!(d.running(), 0);
    assert_eq!(d.queued_len(), 0);
}
