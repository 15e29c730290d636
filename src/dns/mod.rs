//! Asynchronous host resolution.
//!
//! Turns many concurrent hostname-lookup requests into a small number of
//! in-flight system lookups:
//! - requests for the same `(host, port, family)` key coalesce onto one job;
//! - admission is bounded and priority-ordered, with the lowest-priority
//!   queued job evicted when a more urgent arrival finds the queue full;
//! - successful results are cached with lazy TTL expiry;
//! - every request's timeline lands in the session [`NetLog`](crate::netlog::NetLog).
//!
//! # Architecture
//!
//! The `Resolve` trait is the opaque lookup primitive (getaddrinfo or
//! hickory-dns); `HostResolver` is the engine in front of it. The engine
//! mirrors Chromium's `HostResolverImpl`/`PrioritizedDispatcher` pair.
//!
//! # Example
//!
//! ```rust,ignore
//! use hostnet::dns::{GaiResolver, HostResolver, HostResolverOptions, RequestPriority};
//! use hostnet::netlog::NetLog;
//! use std::sync::Arc;
//!
//! let netlog = Arc::new(NetLog::new());
//! let resolver = HostResolver::new(
//!     HostResolverOptions::default(),
//!     Arc::new(GaiResolver::new()),
//!     Arc::clone(&netlog),
//! );
//! let addrs = resolver.resolve("example.com", 443, RequestPriority::Medium).await?;
//! ```

mod addrlist;
mod cache;
mod dispatcher;
mod gai;
mod hickory;
mod job;
mod resolve;
mod resolver;

pub use addrlist::AddressList;
pub use cache::{CacheEntry, HostCache, HostCacheKey};
pub use dispatcher::{Admission, PrioritizedDispatcher, QueueHandle, RequestPriority};
pub use gai::GaiResolver;
pub use hickory::HickoryResolver;
pub use resolve::{AddressFamily, Addrs, Name, Resolve, Resolving};
pub use resolver::{HostResolver, HostResolverOptions};
