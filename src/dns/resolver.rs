//! The host resolver engine.
//!
//! Chromium mapping: net/dns/host_resolver_impl.cc (simplified)
//!
//! Public facade over the cache, the job table and the prioritized
//! dispatcher: a request is served synchronously from the cache, coalesced
//! onto a live job for the same key, or wrapped in a new job and submitted
//! for admission. The underlying lookup primitive is an injected
//! [`Resolve`] implementation; this layer never retries it and surfaces
//! its errors verbatim.
//!
//! # Locking
//!
//! All shared state sits in one `std::sync::Mutex` that is never held
//! across an `.await`: requests suspend on per-waiter oneshot channels, and
//! admitted lookups run as spawned tasks that re-enter through
//! `complete_job`.

use crate::base::neterror::NetError;
use crate::dns::cache::{HostCache, HostCacheKey};
use crate::dns::dispatcher::{Admission, PrioritizedDispatcher, RequestPriority};
use crate::dns::job::{JobState, ResolveJob, Waiter};
use crate::dns::resolve::{AddressFamily, Name, Resolve};
use crate::dns::AddressList;
use crate::netlog::NetLog;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// Construction-time parameters, consumed rather than owned: the resolver
/// takes no configuration source of its own.
#[derive(Debug, Clone)]
pub struct HostResolverOptions {
    /// Hostnames longer than this are rejected before any lookup.
    pub max_hostname_length: usize,
    /// Concurrency limit of the dispatcher.
    pub max_concurrent_resolves: usize,
    /// Capacity of the dispatcher's admission queue.
    pub max_queued_resolves: usize,
    /// Freshness window for cached successes.
    pub cache_ttl: Duration,
}

impl Default for HostResolverOptions {
    /// Chromium's host resolver defaults.
    fn default() -> Self {
        Self {
            max_hostname_length: 4096,
            max_concurrent_resolves: 8,
            max_queued_resolves: 100,
            cache_ttl: Duration::from_secs(60),
        }
    }
}

struct Inner {
    cache: HostCache,
    jobs: HashMap<HostCacheKey, ResolveJob>,
    dispatcher: PrioritizedDispatcher<HostCacheKey>,
}

struct Shared {
    options: HostResolverOptions,
    proc: Arc<dyn Resolve>,
    netlog: Arc<NetLog>,
    inner: Mutex<Inner>,
}

/// Asynchronous, coalescing host resolver.
///
/// Cheap to clone; clones share the cache, job table and dispatcher.
#[derive(Clone)]
pub struct HostResolver {
    shared: Arc<Shared>,
}

impl HostResolver {
    /// Creates a resolver over the given lookup primitive, recording every
    /// request into `netlog`.
    pub fn new(options: HostResolverOptions, proc: Arc<dyn Resolve>, netlog: Arc<NetLog>) -> Self {
        let inner = Inner {
            cache: HostCache::new(),
            jobs: HashMap::new(),
            dispatcher: PrioritizedDispatcher::new(
                options.max_concurrent_resolves,
                options.max_queued_resolves,
            ),
        };
        Self {
            shared: Arc::new(Shared {
                options,
                proc,
                netlog,
                inner: Mutex::new(inner),
            }),
        }
    }

    /// Resolves `host:port`, accepting any address family.
    ///
    /// Synchronous-looking but suspending: a cache hit returns without
    /// yielding, a miss suspends until the shared lookup completes or the
    /// job is evicted. Every call appends exactly one resolution record to
    /// the net log.
    pub async fn resolve(
        &self,
        host: &str,
        port: u16,
        priority: RequestPriority,
    ) -> Result<AddressList, NetError> {
        self.resolve_with_family(host, port, AddressFamily::Unspecified, priority)
            .await
    }

    /// [`resolve`](Self::resolve) with an explicit address-family hint.
    /// Requests that differ only in family do not share a lookup.
    pub async fn resolve_with_family(
        &self,
        host: &str,
        port: u16,
        family: AddressFamily,
        priority: RequestPriority,
    ) -> Result<AddressList, NetError> {
        let shared = &self.shared;
        let record = shared.netlog.begin_dns(host, port);

        if host.len() > shared.options.max_hostname_length {
            tracing::debug!(host_len = host.len(), "rejecting over-long hostname");
            record.finalize(shared.netlog.elapsed(), Err(NetError::HostnameTooLong));
            return Err(NetError::HostnameTooLong);
        }

        // IP literals short-circuit: no lookup, no cache, no job.
        if let Ok(ip) = host.parse::<IpAddr>() {
            let addr = SocketAddr::new(ip, port);
            let result = if family.matches(&addr) {
                Ok(AddressList::new(vec![addr]))
            } else {
                Err(NetError::NameNotResolved)
            };
            record.finalize(shared.netlog.elapsed(), result.clone());
            return result;
        }

        let key = HostCacheKey::new(host, port, family);
        let (tx, rx) = oneshot::channel();

        // Everything inside this block happens under the state lock and
        // must not await.
        let (spawn_key, evicted) = {
            let mut guard = shared.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let inner = &mut *guard;

            if let Some(entry) = inner.cache.lookup(&key, Instant::now()) {
                let addrs = entry.addrs.clone();
                drop(guard);
                tracing::debug!(host = %host, port, "served from host cache");
                record.finalize(shared.netlog.elapsed(), Ok(addrs.clone()));
                return Ok(addrs);
            }

            let waiter = Waiter::new(tx, Arc::clone(&record));

            if let Some(job) = inner.jobs.get_mut(&key) {
                // Coalesce: N callers for one key share one lookup.
                if let Some(raised) = job.attach(waiter, priority) {
                    if let Some(handle) = job.queue_handle.take() {
                        job.queue_handle = inner.dispatcher.reprioritize(handle, raised);
                    }
                }
                (None, None)
            } else {
                let mut job = ResolveJob::new(priority, waiter);
                match inner.dispatcher.submit(key.clone(), priority) {
                    Admission::Admitted => {
                        job.state = JobState::InFlight;
                        inner.jobs.insert(key.clone(), job);
                        (Some(key.clone()), None)
                    }
                    Admission::Queued(handle) => {
                        job.queue_handle = Some(handle);
                        inner.jobs.insert(key.clone(), job);
                        (None, None)
                    }
                    Admission::Displaced { victim, handle } => {
                        let evicted = inner.jobs.remove(&victim);
                        job.queue_handle = Some(handle);
                        inner.jobs.insert(key.clone(), job);
                        (None, evicted)
                    }
                    Admission::Rejected => {
                        // The queue had no room and nothing below this
                        // priority to displace; the request itself fails.
                        job.complete(
                            shared.netlog.elapsed(),
                            Err(NetError::HostResolverQueueTooLarge),
                        );
                        (None, None)
                    }
                }
            }
        };

        if let Some(victim) = evicted {
            victim.complete(
                shared.netlog.elapsed(),
                Err(NetError::HostResolverQueueTooLarge),
            );
        }
        if let Some(key) = spawn_key {
            Shared::spawn_lookup(Arc::clone(shared), key);
        }

        let result = match rx.await {
            Ok(result) => result,
            // The job vanished without fanning out; treated as an abort.
            Err(_) => Err(NetError::Aborted),
        };
        if let Err(e) = &result {
            // Admission errors mean the engine is misconfigured for its
            // load, which is worth more than lookup-failure noise.
            if e.is_admission_error() {
                tracing::warn!(host = %host, port, error = %e, "rejected by admission control");
            }
        }
        result
    }

    /// Cache-only probe: returns a fresh cached result without ever
    /// triggering a lookup. IP literals always "hit".
    pub fn resolve_from_cache(&self, host: &str, port: u16) -> Option<AddressList> {
        self.resolve_from_cache_with_family(host, port, AddressFamily::Unspecified)
    }

    /// [`resolve_from_cache`](Self::resolve_from_cache) with a family hint.
    pub fn resolve_from_cache_with_family(
        &self,
        host: &str,
        port: u16,
        family: AddressFamily,
    ) -> Option<AddressList> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            let addr = SocketAddr::new(ip, port);
            return family
                .matches(&addr)
                .then(|| AddressList::new(vec![addr]));
        }
        let key = HostCacheKey::new(host, port, family);
        let mut inner = self
            .shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        inner
            .cache
            .lookup(&key, Instant::now())
            .map(|entry| entry.addrs.clone())
    }

    /// The telemetry store this resolver records into.
    pub fn netlog(&self) -> Arc<NetLog> {
        Arc::clone(&self.shared.netlog)
    }

    /// Number of lookups currently in flight.
    pub fn num_running_jobs(&self) -> usize {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dispatcher
            .running()
    }

    /// Number of jobs waiting for admission.
    pub fn num_queued_jobs(&self) -> usize {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dispatcher
            .queued_len()
    }
}

impl Shared {
    fn spawn_lookup(shared: Arc<Shared>, key: HostCacheKey) {
        tokio::spawn(async move {
            let result = Shared::run_lookup(&shared, &key).await;
            Shared::complete_job(&shared, &key, result);
        });
    }

    /// Exactly one of these runs per job; issued on the Queued -> InFlight
    /// transition.
    async fn run_lookup(shared: &Shared, key: &HostCacheKey) -> Result<AddressList, NetError> {
        tracing::debug!(host = %key.host, port = key.port, "starting system lookup");
        let addrs = shared.proc.resolve(Name::new(key.host.as_str())).await?;
        let matching: Vec<SocketAddr> = addrs.filter(|a| key.family.matches(a)).collect();
        if matching.is_empty() {
            return Err(NetError::NameNotResolved);
        }
        Ok(AddressList::with_port(matching, key.port))
    }

    fn complete_job(shared: &Arc<Shared>, key: &HostCacheKey, result: Result<AddressList, NetError>) {
        let (job, admitted) = {
            let mut inner = shared.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let job = inner.jobs.remove(key);

            // Successes populate the cache; failures are never cached, so
            // the next identical request retries the lookup.
            if let Ok(addrs) = &result {
                inner.cache.insert(
                    key.clone(),
                    addrs.clone(),
                    shared.options.cache_ttl,
                    Instant::now(),
                );
            }

            let admitted = inner.dispatcher.complete();
            if let Some((next_key, _)) = &admitted {
                if let Some(next) = inner.jobs.get_mut(next_key) {
                    debug_assert_eq!(next.state, JobState::Queued);
                    next.state = JobState::InFlight;
                    next.queue_handle = None;
                }
            }
            (job, admitted)
        };

        if let Some(job) = job {
            tracing::debug!(
                host = %key.host,
                port = key.port,
                waiters = job.num_waiters(),
                ok = result.is_ok(),
                "lookup complete, fanning out"
            );
            job.complete(shared.netlog.elapsed(), result);
        }

        if let Some((next_key, _)) = admitted {
            Shared::spawn_lookup(Arc::clone(shared), next_key);
        }
    }
}
