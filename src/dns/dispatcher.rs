//! Priority-bounded admission control for resolution jobs.
//!
//! Chromium mapping: net/base/prioritized_dispatcher.h
//!
//! A bounded-concurrency admission queue: at most `max_running` jobs are
//! admitted at once, at most `max_queued` wait their turn, and when the
//! queue is full an arriving job either displaces the oldest job at the
//! lowest queued priority (if strictly more urgent) or is rejected.
//!
//! The structure has no interior locking; the resolver engine guards it
//! together with the rest of its shared state.

use std::collections::BTreeMap;

/// Request priority (matches Chromium's RequestPriority).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum RequestPriority {
    Throttled = 0,
    Idle = 1,
    Lowest = 2,
    Low = 3,
    #[default]
    Medium = 4,
    Highest = 5,
}

impl RequestPriority {
    /// Rank for queue ordering: 0 is the most urgent.
    fn rank(self) -> u8 {
        RequestPriority::Highest as u8 - self as u8
    }
}

/// Stable position of a queued item.
///
/// Ordering is (priority rank, arrival sequence), so iterating the queue in
/// key order yields the most urgent, earliest-submitted item first: FIFO
/// within a priority level, strict priority across levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueueHandle {
    rank: u8,
    seq: u64,
}

/// Outcome of submitting an item to the dispatcher.
#[derive(Debug)]
pub enum Admission<T> {
    /// A concurrency slot was free; the item is running now.
    Admitted,
    /// The item is waiting in the queue.
    Queued(QueueHandle),
    /// The queue was full; `victim` (oldest item at the lowest queued
    /// priority) was evicted to make room and the new item is queued.
    Displaced { victim: T, handle: QueueHandle },
    /// The queue was full and nothing queued was lower priority.
    Rejected,
}

/// Admission-controlled priority queue.
///
/// An item is in exactly one of three dispatcher-visible states: queued
/// (present in the queue map), admitted (counted in `running`), or gone.
#[derive(Debug)]
pub struct PrioritizedDispatcher<T> {
    max_running: usize,
    max_queued: usize,
    running: usize,
    next_seq: u64,
    queue: BTreeMap<QueueHandle, (T, RequestPriority)>,
}

impl<T> PrioritizedDispatcher<T> {
    /// Creates a dispatcher admitting up to `max_running` items with up to
    /// `max_queued` waiting.
    pub fn new(max_running: usize, max_queued: usize) -> Self {
        assert!(max_running > 0, "concurrency limit must be at least 1");
        Self {
            max_running,
            max_queued,
            running: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }

    fn next_handle(&mut self, priority: RequestPriority) -> QueueHandle {
        let handle = QueueHandle {
            rank: priority.rank(),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        handle
    }

    /// Oldest queued entry at the lowest queued priority, if any.
    fn eviction_candidate(&self) -> Option<QueueHandle> {
        let worst_rank = self.queue.keys().next_back()?.rank;
        self.queue
            .range(
                QueueHandle {
                    rank: worst_rank,
                    seq: 0,
                }..,
            )
            .next()
            .map(|(handle, _)| *handle)
    }

    /// Submit an item. The caller decides what to do with each outcome; in
    /// particular a `Displaced` victim must be failed by the caller.
    pub fn submit(&mut self, item: T, priority: RequestPriority) -> Admission<T> {
        if self.running < self.max_running {
            self.running += 1;
            return Admission::Admitted;
        }

        if self.queue.len() < self.max_queued {
            let handle = self.next_handle(priority);
            self.queue.insert(handle, (item, priority));
            return Admission::Queued(handle);
        }

        // Queue full: evict only if the newcomer is strictly more urgent
        // than the least urgent queued entry.
        match self.eviction_candidate() {
            Some(candidate) if priority.rank() < candidate.rank => {
                match self.queue.remove(&candidate) {
                    Some((victim, victim_priority)) => {
                        tracing::debug!(
                            ?victim_priority,
                            ?priority,
                            "displacing queued job for higher-priority arrival"
                        );
                        let handle = self.next_handle(priority);
                        self.queue.insert(handle, (item, priority));
                        Admission::Displaced { victim, handle }
                    }
                    None => Admission::Rejected,
                }
            }
            _ => Admission::Rejected,
        }
    }

    /// Frees one concurrency slot and admits the most urgent queued item,
    /// if any. The returned item is running when this returns.
    pub fn complete(&mut self) -> Option<(T, RequestPriority)> {
        debug_assert!(self.running > 0, "complete() without a running item");
        self.running = self.running.saturating_sub(1);

        let next = self.queue.pop_first().map(|(_, entry)| entry)?;
        self.running += 1;
        Some(next)
    }

    /// Removes a queued item without admitting anything.
    pub fn remove(&mut self, handle: QueueHandle) -> Option<(T, RequestPriority)> {
        self.queue.remove(&handle)
    }

    /// Moves a queued item to (the back of) another priority level.
    ///
    /// Returns the new handle, or `None` if the item was no longer queued.
    pub fn reprioritize(
        &mut self,
        handle: QueueHandle,
        priority: RequestPriority,
    ) -> Option<QueueHandle> {
        let (item, _) = self.queue.remove(&handle)?;
        let new_handle = self.next_handle(priority);
        self.queue.insert(new_handle, (item, priority));
        Some(new_handle)
    }

    pub fn running(&self) -> usize {
        self.running
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn max_running(&self) -> usize {
        self.max_running
    }

    pub fn max_queued(&self) -> usize {
        self.max_queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_limit_then_queues() {
        let mut d = PrioritizedDispatcher::new(2, 4);

        assert!(matches!(d.submit("a", RequestPriority::Medium), Admission::Admitted));
        assert!(matches!(d.submit("b", RequestPriority::Medium), Admission::Admitted));
        assert!(matches!(d.submit("c", RequestPriority::Medium), Admission::Queued(_)));
        assert_eq!(d.running(), 2);
        assert_eq!(d.queued_len(), 1);
    }

    #[test]
    fn test_complete_admits_highest_priority_fifo() {
        let mut d = PrioritizedDispatcher::new(1, 8);
        assert!(matches!(d.submit("running", RequestPriority::Medium), Admission::Admitted));

        d.submit("low", RequestPriority::Low);
        d.submit("high-1", RequestPriority::Highest);
        d.submit("high-2", RequestPriority::Highest);
        d.submit("medium", RequestPriority::Medium);

        let order: Vec<&str> = std::iter::from_fn(|| d.complete().map(|(item, _)| item)).collect();
        assert_eq!(order, ["high-1", "high-2", "medium", "low"]);
    }

    #[test]
    fn test_full_queue_evicts_iff_strictly_higher() {
        let mut d = PrioritizedDispatcher::new(1, 2);
        assert!(matches!(d.submit("running", RequestPriority::Medium), Admission::Admitted));
        d.submit("low-1", RequestPriority::Low);
        d.submit("low-2", RequestPriority::Low);

        // Equal priority never evicts
        assert!(matches!(d.submit("low-3", RequestPriority::Low), Admission::Rejected));
        // Lower priority never evicts
        assert!(matches!(d.submit("idle", RequestPriority::Idle), Admission::Rejected));

        // Strictly higher evicts the oldest entry at the lowest level
        match d.submit("medium", RequestPriority::Medium) {
            Admission::Displaced { victim, .. } => assert_eq!(victim, "low-1"),
            other => panic!("expected displacement, got {other:?}"),
        }
        assert_eq!(d.queued_len(), 2);
    }

    #[test]
    fn test_eviction_targets_lowest_of_mixed_queue() {
        let mut d = PrioritizedDispatcher::new(1, 2);
        assert!(matches!(d.submit("running", RequestPriority::Medium), Admission::Admitted));
        d.submit("medium", RequestPriority::Medium);
        d.submit("idle", RequestPriority::Idle);

        match d.submit("high", RequestPriority::Highest) {
            Admission::Displaced { victim, .. } => assert_eq!(victim, "idle"),
            other => panic!("expected displacement, got {other:?}"),
        }
    }

    #[test]
    fn test_remove_and_reprioritize() {
        let mut d = PrioritizedDispatcher::new(1, 4);
        assert!(matches!(d.submit("running", RequestPriority::Medium), Admission::Admitted));

        let h_low = match d.submit("low", RequestPriority::Low) {
            Admission::Queued(h) => h,
            other => panic!("expected queued, got {other:?}"),
        };
        d.submit("medium", RequestPriority::Medium);

        // Raising the low job puts it behind existing entries at the new level
        let h_new = d.reprioritize(h_low, RequestPriority::Medium).unwrap();
        assert!(d.remove(h_low).is_none());

        let (first, _) = d.complete().unwrap();
        assert_eq!(first, "medium");
        let (second, _) = d.complete().unwrap();
        assert_eq!(second, "low");

        assert!(d.remove(h_new).is_none());
    }

    #[test]
    fn test_zero_capacity_queue_rejects() {
        let mut d = PrioritizedDispatcher::new(1, 0);
        assert!(matches!(d.submit("running", RequestPriority::Medium), Admission::Admitted));
        assert!(matches!(d.submit("next", RequestPriority::Highest), Admission::Rejected));
    }
}
