//! Discovery metadata attached to a service advertisement

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv6Addr};

use bytes::Bytes;

use crate::registry::Endpoint;

/// Resolved properties of a discovered service
///
/// Mirrors what an mDNS resolution yields: the TXT key/value pairs, the
/// advertised addresses and the service port. A TXT key may be present
/// without a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceMetadata {
    properties: BTreeMap<String, Option<Bytes>>,
    addresses: Vec<IpAddr>,
    port: u16,
}

impl ServiceMetadata {
    /// Create metadata for a service listening on `port`
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Add an advertised address
    pub fn address(mut self, addr: IpAddr) -> Self {
        self.push_address(addr);
        self
    }

    /// Add a TXT property
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        self.insert_property(key, Some(value.into()));
        self
    }

    pub fn push_address(&mut self, addr: IpAddr) {
        if !self.addresses.contains(&addr) {
            self.addresses.push(addr);
        }
    }

    /// Insert a TXT property; keys are case-insensitive per DNS-SD
    pub fn insert_property(&mut self, key: impl Into<String>, value: Option<Bytes>) {
        self.properties.insert(key.into().to_ascii_lowercase(), value);
    }

    /// Value of a TXT property
    ///
    /// Returns `None` both when the key is absent and when it carries no value.
    pub fn get(&self, key: &str) -> Option<&Bytes> {
        self.properties
            .get(&key.to_ascii_lowercase())
            .and_then(Option::as_ref)
    }

    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Pick the datagram endpoint for this service
    ///
    /// IPv4 is preferred, then routable IPv6. Link-local IPv6 addresses are
    /// never chosen since an `IpAddr` cannot carry their interface scope.
    pub fn endpoint(&self) -> Option<Endpoint> {
        let ip = self
            .addresses
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| {
                self.addresses.iter().find(|addr| match addr {
                    IpAddr::V6(v6) => !is_ipv6_link_local(v6),
                    IpAddr::V4(_) => false,
                })
            })?;

        Some(Endpoint::new(*ip, self.port))
    }
}

/// Check if an IPv6 address is link-local (fe80::/10)
pub(crate) fn is_ipv6_link_local(addr: &Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xffc0) == 0xfe80
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn test_prefers_ipv4() {
        let metadata = ServiceMetadata::new(9000)
            .address(IpAddr::V6(Ipv6Addr::LOCALHOST))
            .address(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)));

        let endpoint = metadata.endpoint().unwrap();
        assert_eq!(endpoint.to_string(), "10.0.0.5:9000");
    }

    #[test]
    fn test_skips_link_local_ipv6() {
        let link_local: Ipv6Addr = "fe80::1".parse().unwrap();
        let global: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let metadata = ServiceMetadata::new(9000)
            .address(IpAddr::V6(link_local))
            .address(IpAddr::V6(global));

        assert_eq!(metadata.endpoint().unwrap().ip(), IpAddr::V6(global));
    }

    #[test]
    fn test_link_local_only_has_no_endpoint() {
        let metadata = ServiceMetadata::new(9000).address(IpAddr::V6("fe80::1".parse().unwrap()));

        assert!(metadata.endpoint().is_none());
    }

    #[test]
    fn test_no_address() {
        assert!(ServiceMetadata::new(9000).endpoint().is_none());
    }

    #[test]
    fn test_property_lookup() {
        let mut metadata = ServiceMetadata::new(9000).property("Type", "PhEvent");
        metadata.insert_property("flag", None);

        assert_eq!(metadata.get("type").map(|v| v.as_ref()), Some(&b"PhEvent"[..]));
        assert!(metadata.get("flag").is_none());
        assert!(metadata.get("missing").is_none());
    }
}
