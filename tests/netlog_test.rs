//! Net-log telemetry tests.
//!
//! Covers:
//! - append/finalize lifecycle and ordering invariants
//! - the relaxed-locking contract: concurrent appends while distinct
//!   records are finalized concurrently, no lock on the finalize path
//! - hard failure on capacity overflow (never silent reallocation)
//! - report rendering for both record kinds

use hostnet::base::neterror::NetError;
use hostnet::dns::AddressList;
use hostnet::netlog::{NetLog, RecordLog, TransactionOutcome, IO_PENDING, OK};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use url::Url;

fn sample_addrs() -> AddressList {
    AddressList::new(vec![SocketAddr::new(
        IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3)),
        80,
    )])
}

#[test]
fn test_all_records_finalized_exactly_once() {
    let log = NetLog::with_capacity(32, 4);

    let mut handles = Vec::new();
    for i in 0..32 {
        handles.push(log.begin_dns(&format!("host-{i}.example"), 80));
    }
    assert!(log.dns().snapshot().iter().all(|r| r.is_pending()));

    for handle in &handles {
        handle.finalize(log.elapsed(), Ok(sample_addrs()));
    }

    let records = log.dns().snapshot();
    assert_eq!(records.len(), 32);
    for record in &records {
        let outcome = record.outcome().expect("no record left pending");
        assert_eq!(outcome.error, OK);
        assert!(outcome.end >= record.start());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_append_and_finalize() {
    // Appenders and finalizers run concurrently; each record has exactly
    // one finalizer (its own task), which is the contract that lets the
    // finalize path skip the append lock.
    let log = Arc::new(NetLog::with_capacity(256, 4));

    let mut tasks = Vec::new();
    for i in 0..256 {
        let log = Arc::clone(&log);
        tasks.push(tokio::spawn(async move {
            let record = log.begin_dns(&format!("host-{i}.example"), 443);
            tokio::task::yield_now().await;
            if i % 2 == 0 {
                record.finalize(log.elapsed(), Ok(sample_addrs()));
            } else {
                record.finalize(log.elapsed(), Err(NetError::NameNotResolved));
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let records = log.dns().snapshot();
    assert_eq!(records.len(), 256);
    for record in &records {
        let outcome = record.outcome().expect("record left pending");
        assert!(outcome.end >= record.start());
        assert!(outcome.error == OK || outcome.error == NetError::NameNotResolved.as_i32());
    }
}

#[test]
#[should_panic(expected = "capacity (4) exceeded")]
fn test_fifth_append_into_capacity_four_fails_loudly() {
    let log: RecordLog<u32> = RecordLog::with_capacity(4);
    for i in 0..5 {
        log.append(i);
    }
}

#[test]
fn test_transaction_report_columns() {
    let log = NetLog::with_capacity(2, 4);

    let plain = log.begin_transaction(&Url::parse("http://a.example/index").unwrap());
    plain.finalize(TransactionOutcome {
        end: log.elapsed(),
        status_line: "HTTP/1.1 200 OK".into(),
        mime_type: "text/html".into(),
        charset: "utf-8".into(),
        redirect: None,
    });

    let redirect = log.begin_transaction(&Url::parse("http://b.example/old").unwrap());
    redirect.finalize(TransactionOutcome {
        end: log.elapsed(),
        status_line: "HTTP/1.1 302 Found".into(),
        mime_type: "text/html".into(),
        charset: "iso-8859-1".into(),
        redirect: Some("http://b.example/new".into()),
    });

    let mut out = Vec::new();
    log.write_report(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    // Non-redirects carry the sentinel column, redirects the target.
    assert!(text.contains("text/html utf-8 http://a.example/index -"));
    assert!(text.contains("iso-8859-1 http://b.example/old http://b.example/new"));
}

#[test]
fn test_pending_records_render_with_io_pending() {
    let log = NetLog::with_capacity(2, 2);
    let _still_open = log.begin_dns("slow.example", 80);

    let json = log.to_json();
    assert_eq!(json["dns"][0]["error"], IO_PENDING);
    assert_eq!(json["dns"][0]["start_ms"], json["dns"][0]["end_ms"]);
}
