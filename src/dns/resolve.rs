//! Core DNS resolution types and traits.
//!
//! This module defines the `Resolve` trait and supporting types that form
//! the foundation of the DNS abstraction layer. The trait is the opaque
//! system-lookup primitive the [`HostResolver`](crate::dns::HostResolver)
//! engine drives; it knows nothing about caching, coalescing or dispatch.

use crate::base::neterror::NetError;
use futures::future::BoxFuture;
use std::{fmt, net::SocketAddr, sync::Arc};

/// A domain name to resolve into IP addresses.
///
/// This is a lightweight wrapper around a hostname string that provides
/// a type-safe way to pass domain names to resolvers.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the hostname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// Address family hint attached to a resolution request.
///
/// Part of the cache/coalescing key: requests that differ only in family do
/// not share a lookup, since their results differ.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum AddressFamily {
    /// Accept both IPv4 and IPv6 results.
    #[default]
    Unspecified,
    /// Keep only IPv4 results.
    Ipv4,
    /// Keep only IPv6 results.
    Ipv6,
}

impl AddressFamily {
    /// Whether `addr` satisfies this family hint.
    pub fn matches(&self, addr: &SocketAddr) -> bool {
        match self {
            AddressFamily::Unspecified => true,
            AddressFamily::Ipv4 => addr.is_ipv4(),
            AddressFamily::Ipv6 => addr.is_ipv6(),
        }
    }
}

/// Alias for an `Iterator` trait object over `SocketAddr`.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Alias for the `Future` type returned by a DNS resolver.
pub type Resolving = BoxFuture<'static, Result<Addrs, NetError>>;

/// Trait for DNS resolution.
///
/// This is the engine's view of the operating system's lookup primitive,
/// equivalent to Chromium's proc-task layer. Implementations must be
/// thread-safe.
///
/// # Design Notes
///
/// - Resolution is assumed to always be ready (no backpressure); admission
///   control belongs to the engine, not the primitive.
/// - Uses `&self` for concurrent resolution without mutable access.
/// - Returns boxed futures for trait object compatibility.
/// - Returned addresses carry port 0; the engine applies the request port.
pub trait Resolve: Send + Sync {
    /// Resolves a domain name to IP addresses.
    fn resolve(&self, name: Name) -> Resolving;
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_name_from_str() {
        let name = Name::from("example.com");
        assert_eq!(name.as_str(), "example.com");
        assert_eq!(name.to_string(), "example.com");
    }

    #[test]
    fn test_name_equality() {
        let name1 = Name::new("example.com");
        let name2 = Name::new("example.com");
        let name3 = Name::new("other.com");

        assert_eq!(name1, name2);
        assert_ne!(name1, name3);
    }

    #[test]
    fn test_family_matches() {
        let v4 = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 80);
        let v6 = SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 80);

        assert!(AddressFamily::Unspecified.matches(&v4));
        assert!(AddressFamily::Unspecified.matches(&v6));
        assert!(AddressFamily::Ipv4.matches(&v4));
        assert!(!AddressFamily::Ipv4.matches(&v6));
        assert!(AddressFamily::Ipv6.matches(&v6));
        assert!(!AddressFamily::Ipv6.matches(&v4));
    }
}
