//! # hostnet
//!
//! A Chromium-inspired asynchronous host resolution engine for Rust.
//!
//! `hostnet` turns many concurrent hostname-lookup requests into a small
//! number of in-flight system lookups, enforces bounded concurrency and
//! fairness across priorities, caches results, and records the full
//! timeline of every resolution and HTTP transaction into a low-overhead
//! session net log for offline analysis.
//!
//! ## Features
//!
//! - **Request coalescing**: N callers for one key trigger exactly one lookup
//! - **Prioritized dispatch**: bounded concurrency, bounded queue, eviction
//!   of the lowest-priority queued job under pressure
//! - **Host cache**: TTL freshness with lazy expiry, successes only
//! - **Pluggable lookup**: system `getaddrinfo` or async hickory-dns
//! - **Net-log telemetry**: pre-sized record logs, lock-free finalization,
//!   plain-text and JSON session reports
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hostnet::dns::{GaiResolver, HostResolver, HostResolverOptions, RequestPriority};
//! use hostnet::netlog::NetLog;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let netlog = Arc::new(NetLog::new());
//!     let resolver = HostResolver::new(
//!         HostResolverOptions::default(),
//!         Arc::new(GaiResolver::new()),
//!         Arc::clone(&netlog),
//!     );
//!
//!     let addrs = resolver
//!         .resolve("example.com", 443, RequestPriority::Medium)
//!         .await
//!         .unwrap();
//!     println!("Resolved: {addrs}");
//!
//!     let mut report = Vec::new();
//!     netlog.write_report(&mut report).unwrap();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Core types and error definitions
//! - [`dns`] - Resolver engine, cache, dispatcher, and lookup primitives
//! - [`netlog`] - Session telemetry and report rendering

pub mod base;
pub mod dns;
pub mod netlog;
