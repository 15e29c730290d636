//! Host resolution cache.
//!
//! Chromium mapping: net/dns/host_cache.h (simplified in-memory version)
//!
//! A pure data structure with no interior locking: the resolver engine owns
//! it and guards it together with the rest of its shared state. Expiry is
//! checked only at lookup time (explicit lazy-expiry policy); there is no
//! background sweep.

use crate::dns::resolve::AddressFamily;
use crate::dns::AddressList;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Cache and coalescing key for one resolution.
///
/// Equality defines coalescing: two requests with equal keys share one
/// lookup and one cache slot.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct HostCacheKey {
    pub host: String,
    pub port: u16,
    pub family: AddressFamily,
}

impl HostCacheKey {
    pub fn new(host: impl Into<String>, port: u16, family: AddressFamily) -> Self {
        Self {
            host: host.into(),
            port,
            family,
        }
    }
}

/// Cached resolution result.
///
/// Only successful resolutions are cached; an entry present here is always
/// consistent with the most recent completed lookup for its key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub addrs: AddressList,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    /// Check if the entry is still fresh at `now`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.inserted_at + self.ttl
    }
}

/// In-memory host cache with lazy expiry.
///
/// Takes `now` explicitly so freshness is testable without sleeping.
#[derive(Debug, Default)]
pub struct HostCache {
    entries: HashMap<HostCacheKey, CacheEntry>,
}

impl HostCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached result.
    ///
    /// A hit requires the entry to exist and be unexpired; an expired entry
    /// is removed here and reported as a miss.
    pub fn lookup(&mut self, key: &HostCacheKey, now: Instant) -> Option<&CacheEntry> {
        match self.entries.get(key) {
            Some(entry) if entry.is_fresh(now) => {}
            Some(_) => {
                tracing::debug!(host = %key.host, port = key.port, "evicting stale cache entry");
                self.entries.remove(key);
                return None;
            }
            None => return None,
        }
        self.entries.get(key)
    }

    /// Store a successful resolution, overwriting any prior entry.
    pub fn insert(&mut self, key: HostCacheKey, addrs: AddressList, ttl: Duration, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                addrs,
                inserted_at: now,
                ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    fn key(host: &str) -> HostCacheKey {
        HostCacheKey::new(host, 80, AddressFamily::Unspecified)
    }

    fn addrs() -> AddressList {
        AddressList::new(vec![SocketAddr::new(
            IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
            80,
        )])
    }

    #[test]
    fn test_insert_then_lookup() {
        let mut cache = HostCache::new();
        let now = Instant::now();
        cache.insert(key("a.example"), addrs(), Duration::from_secs(60), now);

        let hit = cache.lookup(&key("a.example"), now).expect("fresh hit");
        assert_eq!(hit.addrs, addrs());
        assert!(cache.lookup(&key("b.example"), now).is_none());
    }

    #[test]
    fn test_expired_entry_is_miss_and_removed() {
        let mut cache = HostCache::new();
        let now = Instant::now();
        cache.insert(key("a.example"), addrs(), Duration::from_secs(60), now);

        // One tick past the TTL deadline
        let later = now + Duration::from_secs(60);
        assert!(cache.lookup(&key("a.example"), later).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let mut cache = HostCache::new();
        let now = Instant::now();
        cache.insert(key("a.example"), addrs(), Duration::from_secs(60), now);

        // Just inside the window
        let almost = now + Duration::from_secs(60) - Duration::from_nanos(1);
        assert!(cache.lookup(&key("a.example"), almost).is_some());
    }

    #[test]
    fn test_insert_overwrites() {
        let mut cache = HostCache::new();
        let now = Instant::now();
        cache.insert(key("a.example"), addrs(), Duration::from_secs(60), now);

        let newer = AddressList::new(vec![SocketAddr::new(
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            80,
        )]);
        cache.insert(
            key("a.example"),
            newer.clone(),
            Duration::from_secs(60),
            now,
        );

        assert_eq!(cache.len(), 1);
        let hit = cache.lookup(&key("a.example"), now).unwrap();
        assert_eq!(hit.addrs, newer);
    }

    #[test]
    fn test_family_is_part_of_key() {
        let mut cache = HostCache::new();
        let now = Instant::now();
        cache.insert(
            HostCacheKey::new("a.example", 80, AddressFamily::Ipv4),
            addrs(),
            Duration::from_secs(60),
            now,
        );

        assert!(cache
            .lookup(
                &HostCacheKey::new("a.example", 80, AddressFamily::Ipv6),
                now
            )
            .is_none());
    }
}
