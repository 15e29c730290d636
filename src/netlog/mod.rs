//! Session telemetry.
//!
//! Chromium mapping: net/log/ (heavily simplified)
//!
//! Records the full timeline of every DNS resolution and every HTTP
//! transaction for post-hoc analysis, without perturbing the hot path it
//! observes: records live in pre-sized logs, appends take a short-lived
//! lock, and finalization is a lock-free single publication through the
//! handle returned at append time.
//!
//! A [`NetLog`] is created at session start, injected into every component
//! that records events, and drained into a report when the session ends.
//! There is deliberately no process-wide instance.

mod buffer;
mod record;
mod report;

pub use buffer::RecordLog;
pub use record::{DnsOutcome, DnsRecord, TransactionOutcome, TransactionRecord, IO_PENDING, OK};
pub use report::{DnsReportRow, TransactionReportRow};

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Default capacity of the resolution log.
const DEFAULT_DNS_CAPACITY: usize = 1024;
/// Default capacity of the transaction log.
const DEFAULT_TRANSACTION_CAPACITY: usize = 4096;

/// Per-session telemetry store.
///
/// All record offsets are relative to the session start captured at
/// construction.
#[derive(Debug)]
pub struct NetLog {
    started_at: Instant,
    dns: RecordLog<DnsRecord>,
    transactions: RecordLog<TransactionRecord>,
}

impl Default for NetLog {
    fn default() -> Self {
        Self::new()
    }
}

impl NetLog {
    /// Creates a log with default capacities.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_DNS_CAPACITY, DEFAULT_TRANSACTION_CAPACITY)
    }

    /// Creates a log sized for the session's expected load.
    ///
    /// Sizing is load-bearing: exceeding either capacity is a hard error,
    /// not a degrade path (see [`RecordLog::append`]).
    pub fn with_capacity(dns_capacity: usize, transaction_capacity: usize) -> Self {
        Self {
            started_at: Instant::now(),
            dns: RecordLog::with_capacity(dns_capacity),
            transactions: RecordLog::with_capacity(transaction_capacity),
        }
    }

    /// Offset of `now` from session start.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Opens a resolution record. The returned handle is the only way to
    /// finalize it.
    pub fn begin_dns(&self, host: &str, port: u16) -> Arc<DnsRecord> {
        self.dns.append(DnsRecord::new(host, port, self.elapsed()))
    }

    /// Opens a transaction record at transaction start.
    pub fn begin_transaction(&self, url: &Url) -> Arc<TransactionRecord> {
        self.transactions
            .append(TransactionRecord::new(url.as_str(), self.elapsed()))
    }

    pub fn dns(&self) -> &RecordLog<DnsRecord> {
        &self.dns
    }

    pub fn transactions(&self) -> &RecordLog<TransactionRecord> {
        &self.transactions
    }

    /// Writes the plain-text session report. Intended for the shutdown
    /// drain, after all writers have finished.
    pub fn write_report<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        report::write_report(self, w)
    }

    /// JSON export of the session report.
    pub fn to_json(&self) -> serde_json::Value {
        report::to_json(self)
    }
}
