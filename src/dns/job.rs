//! One in-flight resolution shared by coalesced requests.
//!
//! A job exists from the moment the first cache-missing request for a key
//! arrives until its fan-out completes; while it lives, every further
//! request for the same key attaches as a waiter instead of issuing another
//! lookup. The job is owned by the resolver's shared state (and referenced
//! by the dispatcher) while queued or in flight, and consumed by
//! [`ResolveJob::complete`]: consumption is the terminal state.

use crate::base::neterror::NetError;
use crate::dns::dispatcher::{QueueHandle, RequestPriority};
use crate::dns::AddressList;
use crate::netlog::DnsRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// One attached request: its completion channel and its telemetry record.
pub(crate) struct Waiter {
    tx: oneshot::Sender<Result<AddressList, NetError>>,
    record: Arc<DnsRecord>,
}

impl Waiter {
    pub(crate) fn new(
        tx: oneshot::Sender<Result<AddressList, NetError>>,
        record: Arc<DnsRecord>,
    ) -> Self {
        Self { tx, record }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobState {
    /// Waiting for a dispatcher slot; no lookup issued yet.
    Queued,
    /// Exactly one system lookup is running for this key.
    InFlight,
}

pub(crate) struct ResolveJob {
    pub(crate) state: JobState,
    /// Max over all attached waiters.
    pub(crate) priority: RequestPriority,
    /// Present while the job sits in the dispatcher queue.
    pub(crate) queue_handle: Option<QueueHandle>,
    waiters: Vec<Waiter>,
}

impl ResolveJob {
    pub(crate) fn new(priority: RequestPriority, first: Waiter) -> Self {
        Self {
            state: JobState::Queued,
            priority,
            queue_handle: None,
            waiters: vec![first],
        }
    }

    /// Attaches another coalesced request. Returns the job's new priority
    /// if the newcomer raised it (the caller then reprioritizes the queued
    /// job).
    pub(crate) fn attach(&mut self, waiter: Waiter, priority: RequestPriority) -> Option<RequestPriority> {
        self.waiters.push(waiter);
        if priority > self.priority {
            self.priority = priority;
            Some(priority)
        } else {
            None
        }
    }

    pub(crate) fn num_waiters(&self) -> usize {
        self.waiters.len()
    }

    /// Fans the shared outcome out to every waiter and finalizes each
    /// waiter's record. All waiters of one job see the same result; there
    /// is no partial success.
    ///
    /// A waiter whose receiver is gone was cancelled by its caller; it is
    /// skipped and its record finalized as aborted. The result itself is
    /// unaffected, since the lookup was shared.
    pub(crate) fn complete(self, end: Duration, result: Result<AddressList, NetError>) {
        for Waiter { tx, record } in self.waiters {
            match tx.send(result.clone()) {
                Ok(()) => record.finalize(end, result.clone()),
                Err(_) => record.finalize(end, Err(NetError::Aborted)),
            }
        }
    }
}
