//! Telemetry record types.
//!
//! Each record is an immutable open-half written at append time plus an
//! outcome written exactly once by the sole finalizer, through the handle
//! returned by [`RecordLog::append`](crate::netlog::RecordLog::append).
//! The outcome lives in a `OnceLock`, so finalization never takes the
//! append lock: publication is a single atomic store, and the
//! single-writer-exactly-once contract is enforced by the type rather than
//! by convention. A record whose outcome is unset is pending.

use crate::base::neterror::NetError;
use crate::dns::AddressList;
use std::sync::OnceLock;
use std::time::Duration;

/// Result code meaning success in report output (Chromium's `net::OK`).
pub const OK: i32 = 0;

/// Result code of a record still awaiting its finalization (Chromium's
/// `net::ERR_IO_PENDING`). Only ever visible in a report drained while
/// writers were still active.
pub const IO_PENDING: i32 = -1;

/// Final fields of one resolution.
#[derive(Debug, Clone)]
pub struct DnsOutcome {
    /// Offset from session start.
    pub end: Duration,
    /// Resolved endpoints; empty on failure.
    pub addrs: AddressList,
    /// [`OK`] or a `NetError` code.
    pub error: i32,
}

/// Timeline record of one resolution request.
///
/// Opened when the request enters the resolver (cache hit or miss alike)
/// and finalized exactly once when its outcome is known.
#[derive(Debug)]
pub struct DnsRecord {
    host: String,
    port: u16,
    start: Duration,
    outcome: OnceLock<DnsOutcome>,
}

impl DnsRecord {
    pub(crate) fn new(host: impl Into<String>, port: u16, start: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            start,
            outcome: OnceLock::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Offset from session start at which the request entered the resolver.
    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn outcome(&self) -> Option<&DnsOutcome> {
        self.outcome.get()
    }

    /// Still waiting for its single finalization.
    pub fn is_pending(&self) -> bool {
        self.outcome.get().is_none()
    }

    /// Publishes the outcome. Must be called exactly once, by the single
    /// owner of this record's handle.
    pub fn finalize(&self, end: Duration, result: Result<AddressList, NetError>) {
        let outcome = match result {
            Ok(addrs) => DnsOutcome {
                end,
                addrs,
                error: OK,
            },
            Err(e) => DnsOutcome {
                end,
                addrs: AddressList::default(),
                error: e.as_i32(),
            },
        };
        if self.outcome.set(outcome).is_err() {
            tracing::error!(
                host = %self.host,
                port = self.port,
                "resolution record finalized twice"
            );
            debug_assert!(false, "resolution record finalized twice");
        }
    }
}

/// Final fields of one HTTP transaction.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    /// Offset from session start.
    pub end: Duration,
    pub status_line: String,
    pub mime_type: String,
    pub charset: String,
    /// Redirect target, if the response was a redirect.
    pub redirect: Option<String>,
}

/// Timeline record of one HTTP transaction.
///
/// Created at transaction start by the transport layer and finalized once
/// at transaction teardown.
#[derive(Debug)]
pub struct TransactionRecord {
    url: String,
    start: Duration,
    outcome: OnceLock<TransactionOutcome>,
}

impl TransactionRecord {
    pub(crate) fn new(url: impl Into<String>, start: Duration) -> Self {
        Self {
            url: url.into(),
            start,
            outcome: OnceLock::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn outcome(&self) -> Option<&TransactionOutcome> {
        self.outcome.get()
    }

    pub fn is_pending(&self) -> bool {
        self.outcome.get().is_none()
    }

    /// Publishes the outcome. Must be called exactly once, at teardown.
    pub fn finalize(&self, outcome: TransactionOutcome) {
        if self.outcome.set(outcome).is_err() {
            tracing::error!(url = %self.url, "transaction record finalized twice");
            debug_assert!(false, "transaction record finalized twice");
        }
    }
}
