//! Resolved address list.
//!
//! Chromium mapping: net/base/address_list.h

use std::fmt;
use std::net::SocketAddr;

/// An ordered list of resolved endpoints with the request port applied.
///
/// Immutable once produced: a successful resolution hands the same list to
/// every coalesced waiter and to the host cache. An empty list only appears
/// on failure paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressList {
    addrs: Vec<SocketAddr>,
}

impl AddressList {
    /// Creates a list from already port-qualified addresses.
    pub fn new(addrs: Vec<SocketAddr>) -> Self {
        Self { addrs }
    }

    /// Creates a list from raw lookup results, applying `port` to each.
    pub fn with_port(addrs: impl IntoIterator<Item = SocketAddr>, port: u16) -> Self {
        let addrs = addrs
            .into_iter()
            .map(|mut addr| {
                addr.set_port(port);
                addr
            })
            .collect();
        Self { addrs }
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// The first (most preferred) endpoint, if any.
    pub fn first(&self) -> Option<SocketAddr> {
        self.addrs.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SocketAddr> {
        self.addrs.iter()
    }

    pub fn as_slice(&self) -> &[SocketAddr] {
        &self.addrs
    }

    pub fn into_vec(self) -> Vec<SocketAddr> {
        self.addrs
    }
}

impl From<Vec<SocketAddr>> for AddressList {
    fn from(addrs: Vec<SocketAddr>) -> Self {
        Self::new(addrs)
    }
}

impl IntoIterator for AddressList {
    type Item = SocketAddr;
    type IntoIter = std::vec::IntoIter<SocketAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.addrs.into_iter()
    }
}

impl fmt::Display for AddressList {
    /// Space-separated endpoint list, the form the net-log report uses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for addr in &self.addrs {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{addr}")?;
            first = false;
        }
        Ok(())
    }
}
