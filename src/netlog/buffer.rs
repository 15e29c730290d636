//! Pre-sized, append-mostly record store.
//!
//! The backing vector reserves its full capacity at construction and is
//! never allowed to grow past it: records are handed out as stable `Arc`
//! handles at append time, and the whole telemetry contract rests on a
//! handle staying valid while appends continue elsewhere. Appending beyond
//! capacity therefore fails loudly instead of reallocating or dropping.
//!
//! Append takes a short-lived lock; finalization does not go through the
//! buffer at all (see [`record`](crate::netlog::record)).

use std::sync::{Arc, Mutex, PoisonError};

/// Fixed-capacity append log handing out stable record handles.
#[derive(Debug)]
pub struct RecordLog<T> {
    records: Mutex<Vec<Arc<T>>>,
    capacity: usize,
}

impl<T> RecordLog<T> {
    /// Creates a log that can hold up to `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends a record and returns its stable handle.
    ///
    /// Safe to call concurrently from many request contexts; the lock is
    /// held only for the push.
    ///
    /// # Panics
    ///
    /// Panics when the log is full. Overflow means the log was sized below
    /// the session's actual load, which is a configuration defect, not a
    /// transient condition.
    pub fn append(&self, record: T) -> Arc<T> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        assert!(
            records.len() < self.capacity,
            "record log capacity ({}) exceeded",
            self.capacity
        );
        let handle = Arc::new(record);
        records.push(Arc::clone(&handle));
        handle
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of every record in append order.
    ///
    /// Intended for the shutdown drain: the records themselves are shared,
    /// so a snapshot taken while finalizers are still active may observe
    /// pending records.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
