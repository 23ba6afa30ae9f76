//! mDNS discovery source
//!
//! Browses the configured service type with `mdns-sd`. Resolved services are
//! cached before the appeared notification is emitted, so resolving a name
//! from the handler is a local lookup that never touches the network.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use mdns_sd::{ResolvedService, ServiceDaemon, ServiceEvent};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::capability::ServiceMetadata;
use crate::registry::ServiceName;

use super::error::DiscoveryError;
use super::event::{DiscoveryEvent, DiscoverySource, ServiceResolver};

type ResolvedCache = Arc<RwLock<HashMap<ServiceName, ServiceMetadata>>>;

/// Resolver backed by the services an [`MdnsDiscovery`] has resolved
#[derive(Debug, Clone)]
pub struct MdnsResolver {
    cache: ResolvedCache,
}

impl ServiceResolver for MdnsResolver {
    async fn resolve(&self, name: &ServiceName) -> Result<ServiceMetadata, DiscoveryError> {
        self.cache
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| DiscoveryError::ResolutionFailed(name.clone()))
    }
}

/// Discovery source browsing a DNS-SD service type over multicast DNS
pub struct MdnsDiscovery {
    daemon: ServiceDaemon,
    service_type: String,
    channel_capacity: usize,
    cache: ResolvedCache,
    pump: Option<JoinHandle<()>>,
}

impl MdnsDiscovery {
    /// Create a browser for `service_type` using the standard mDNS port
    pub fn new(service_type: impl Into<String>) -> Result<Self, DiscoveryError> {
        Self::with_port(service_type, mdns_sd::MDNS_PORT)
    }

    /// Create a browser bound to a custom mDNS port
    ///
    /// Publisher and browser must agree on the port.
    pub fn with_port(service_type: impl Into<String>, port: u16) -> Result<Self, DiscoveryError> {
        let daemon = ServiceDaemon::new_with_port(port)
            .map_err(|e| DiscoveryError::DaemonFailed(e.to_string()))?;

        Ok(Self {
            daemon,
            service_type: service_type.into(),
            channel_capacity: 64,
            cache: Arc::new(RwLock::new(HashMap::new())),
            pump: None,
        })
    }

    /// Set the capacity of the notification channel
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }
}

impl DiscoverySource for MdnsDiscovery {
    type Resolver = MdnsResolver;

    fn start(&mut self) -> Result<mpsc::Receiver<DiscoveryEvent>, DiscoveryError> {
        if self.pump.is_some() {
            return Err(DiscoveryError::BrowseFailed(format!(
                "{} is already being browsed",
                self.service_type
            )));
        }

        let receiver = self
            .daemon
            .browse(&self.service_type)
            .map_err(|e| DiscoveryError::BrowseFailed(e.to_string()))?;

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let cache = Arc::clone(&self.cache);
        let service_type = self.service_type.clone();

        self.pump = Some(tokio::spawn(async move {
            loop {
                let event = match receiver.recv_async().await {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(error = %e, "mDNS event channel closed");
                        break;
                    }
                };

                let notification = match event {
                    ServiceEvent::ServiceResolved(info) => {
                        let name = ServiceName::new(info.get_fullname());
                        cache
                            .write()
                            .await
                            .insert(name.clone(), metadata_from_resolved(&info));

                        DiscoveryEvent::ServiceAppeared {
                            name,
                            service_type: service_type.clone(),
                        }
                    }
                    ServiceEvent::ServiceRemoved(_, fullname) => {
                        let name = ServiceName::from(fullname);
                        cache.write().await.remove(&name);

                        DiscoveryEvent::ServiceVanished {
                            name,
                            service_type: service_type.clone(),
                        }
                    }
                    other => {
                        tracing::trace!(event = ?other, "Ignoring mDNS event");
                        continue;
                    }
                };

                if tx.send(notification).await.is_err() {
                    break;
                }
            }
        }));

        tracing::info!(service_type = %self.service_type, "Started mDNS browsing");
        Ok(rx)
    }

    fn stop(&mut self) -> Result<(), DiscoveryError> {
        let Some(pump) = self.pump.take() else {
            return Ok(());
        };
        pump.abort();

        self.daemon
            .stop_browse(&self.service_type)
            .map_err(|e| DiscoveryError::StopBrowseFailed(e.to_string()))?;

        tracing::info!(service_type = %self.service_type, "Stopped mDNS browsing");
        Ok(())
    }

    fn resolver(&self) -> MdnsResolver {
        MdnsResolver {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl Drop for MdnsDiscovery {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        let _ = self.daemon.shutdown();
    }
}

/// Convert a resolved mDNS record into service metadata
fn metadata_from_resolved(info: &ResolvedService) -> ServiceMetadata {
    let mut metadata = ServiceMetadata::new(info.get_port());

    for addr in info.get_addresses() {
        metadata.push_address(addr.to_ip_addr());
    }

    for property in info.get_properties().iter() {
        metadata.insert_property(property.key(), property.val().map(Bytes::copy_from_slice));
    }

    metadata
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use mdns_sd::{ServiceInfo, TxtProperty};

    use super::*;
    use crate::capability::{CapabilityMatcher, PayloadTypeTag};
    use crate::registry::Endpoint;

    #[test]
    fn test_metadata_from_resolved() {
        let properties = vec![
            TxtProperty::from(("Type", "PhEvent")),
            TxtProperty::from("flag"),
        ];
        let info = ServiceInfo::new(
            "_capnproto._udp.local.",
            "ph-consumer",
            "sensor.local.",
            "10.0.0.5",
            9000,
            properties,
        )
        .unwrap();

        let metadata = metadata_from_resolved(&info.as_resolved_service());

        assert_eq!(metadata.port(), 9000);
        assert_eq!(
            metadata.addresses(),
            &[IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))][..]
        );
        assert_eq!(
            metadata.endpoint(),
            Some(Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 9000))
        );
        assert_eq!(metadata.get("type").map(|v| v.as_ref()), Some(&b"PhEvent"[..]));
        assert!(metadata.get("flag").is_none());

        let matcher = CapabilityMatcher::new();
        assert_eq!(matcher.matches(&metadata, &PayloadTypeTag::from("PhEvent")), Ok(true));
        assert_eq!(matcher.matches(&metadata, &PayloadTypeTag::from("Co2Event")), Ok(false));
    }

    #[tokio::test]
    async fn test_mdns_discovery_new() {
        // Creating the daemon needs a usable network interface
        match MdnsDiscovery::with_port("_capnproto._udp.local.", 5454) {
            Ok(mut discovery) => {
                assert_eq!(discovery.service_type(), "_capnproto._udp.local.");
                assert!(discovery.stop().is_ok());
            }
            Err(e) => tracing::debug!(error = %e, "mDNS not available"),
        }
    }

    #[tokio::test]
    async fn test_resolver_unknown_service() {
        let resolver = MdnsResolver {
            cache: Arc::new(RwLock::new(HashMap::new())),
        };

        let result = resolver.resolve(&ServiceName::new("ghost")).await;
        assert_eq!(result, Err(DiscoveryError::ResolutionFailed("ghost".into())));
    }
}
