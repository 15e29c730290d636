//! Shutdown report rendering.
//!
//! Drains both record logs into the human-readable dump written at session
//! end, plus a JSON export for machine consumption. Reading is safe once no
//! finalizers are active; a record still pending at drain time is rendered
//! with the in-progress sentinel code.

use crate::netlog::record::{DnsRecord, TransactionRecord, IO_PENDING};
use crate::netlog::NetLog;
use serde::Serialize;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Sentinel column for a transaction that was not a redirect.
const NO_REDIRECT: &str = "-";

fn ms(d: Duration) -> u64 {
    d.as_millis() as u64
}

/// One resolution row of the report.
#[derive(Debug, Serialize)]
pub struct DnsReportRow {
    pub start_ms: u64,
    pub end_ms: u64,
    pub duration_ms: u64,
    pub error: i32,
    pub host: String,
    pub port: u16,
    pub addrs: Vec<String>,
}

impl DnsReportRow {
    fn from_record(record: &DnsRecord) -> Self {
        let start = record.start();
        // Pending records keep end == start and the in-progress code.
        let (end, error, addrs) = match record.outcome() {
            Some(outcome) => (
                outcome.end,
                outcome.error,
                outcome.addrs.iter().map(|a| a.to_string()).collect(),
            ),
            None => (start, IO_PENDING, Vec::new()),
        };
        Self {
            start_ms: ms(start),
            end_ms: ms(end),
            duration_ms: ms(end.saturating_sub(start)),
            error,
            host: record.host().to_string(),
            port: record.port(),
            addrs,
        }
    }
}

/// One transaction row of the report.
#[derive(Debug, Serialize)]
pub struct TransactionReportRow {
    pub start_ms: u64,
    pub end_ms: u64,
    pub duration_ms: u64,
    pub url: String,
    pub status_line: String,
    pub mime_type: String,
    pub charset: String,
    pub redirect: Option<String>,
}

impl TransactionReportRow {
    fn from_record(record: &TransactionRecord) -> Self {
        let start = record.start();
        match record.outcome() {
            Some(outcome) => Self {
                start_ms: ms(start),
                end_ms: ms(outcome.end),
                duration_ms: ms(outcome.end.saturating_sub(start)),
                url: record.url().to_string(),
                status_line: outcome.status_line.clone(),
                mime_type: outcome.mime_type.clone(),
                charset: outcome.charset.clone(),
                redirect: outcome.redirect.clone(),
            },
            None => Self {
                start_ms: ms(start),
                end_ms: ms(start),
                duration_ms: 0,
                url: record.url().to_string(),
                status_line: String::new(),
                mime_type: String::new(),
                charset: String::new(),
                redirect: None,
            },
        }
    }
}

pub(crate) fn dns_rows(records: &[Arc<DnsRecord>]) -> Vec<DnsReportRow> {
    records.iter().map(|r| DnsReportRow::from_record(r)).collect()
}

pub(crate) fn transaction_rows(records: &[Arc<TransactionRecord>]) -> Vec<TransactionReportRow> {
    records
        .iter()
        .map(|r| TransactionReportRow::from_record(r))
        .collect()
}

/// Writes the plain-text session report.
///
/// Columns per resolution line: start-offset-ms, end-offset-ms, duration-ms,
/// error code, `host:port`, space-separated resolved addresses. Each
/// transaction contributes a timing line (start, end, duration, url) and an
/// outcome line (status line, mime type, charset, url, redirect or `-`).
pub(crate) fn write_report<W: io::Write>(log: &NetLog, w: &mut W) -> io::Result<()> {
    writeln!(w, "# dns resolutions")?;
    for row in dns_rows(&log.dns().snapshot()) {
        writeln!(
            w,
            "{} {} {} {} {}:{} {}",
            row.start_ms,
            row.end_ms,
            row.duration_ms,
            row.error,
            row.host,
            row.port,
            row.addrs.join(" ")
        )?;
    }

    writeln!(w, "# http transactions")?;
    for row in transaction_rows(&log.transactions().snapshot()) {
        writeln!(
            w,
            "{} {} {} {}",
            row.start_ms, row.end_ms, row.duration_ms, row.url
        )?;
        writeln!(
            w,
            "{} {} {} {} {}",
            row.status_line,
            row.mime_type,
            row.charset,
            row.url,
            row.redirect.as_deref().unwrap_or(NO_REDIRECT)
        )?;
    }
    Ok(())
}

/// JSON export of both logs.
pub(crate) fn to_json(log: &NetLog) -> serde_json::Value {
    serde_json::json!({
        "dns": dns_rows(&log.dns().snapshot()),
        "transactions": transaction_rows(&log.transactions().snapshot()),
    })
}
