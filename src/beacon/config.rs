//! Beacon configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::capability::{DescriptorRef, DescriptorTable, PayloadTypeTag};
use crate::discovery::DEFAULT_SERVICE_TYPE;
use crate::producer::PhEvent;

/// Beacon configuration options
#[derive(Debug, Clone)]
pub struct BeaconConfig {
    /// DNS-SD service type consumers advertise
    pub service_type: String,

    /// Payload tag this beacon broadcasts
    pub payload_tag: PayloadTypeTag,

    /// Time between broadcasts in the producer loop
    pub publish_interval: Duration,

    /// Local address of the sending UDP socket
    pub bind_addr: SocketAddr,

    /// Upper bound for a single datagram send
    pub send_timeout: Duration,

    /// Upper bound for a single metadata lookup
    pub resolve_timeout: Duration,

    /// Capacity of the discovery notification channel
    pub event_channel_capacity: usize,

    /// UDP port used for multicast DNS
    pub mdns_port: u16,

    /// Data pathway descriptors for indirect capability matching
    pub descriptors: DescriptorTable,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            payload_tag: PhEvent::TAG,
            publish_interval: Duration::from_secs(1),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 0)),
            send_timeout: Duration::from_millis(100),
            resolve_timeout: Duration::from_secs(3),
            event_channel_capacity: 64,
            mdns_port: 5353,
            descriptors: DescriptorTable::new(),
        }
    }
}

impl BeaconConfig {
    /// Create a config broadcasting `tag`
    pub fn with_tag(tag: impl Into<PayloadTypeTag>) -> Self {
        Self {
            payload_tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set the browsed service type
    pub fn service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = service_type.into();
        self
    }

    /// Set the broadcast interval
    pub fn publish_interval(mut self, interval: Duration) -> Self {
        self.publish_interval = interval;
        self
    }

    /// Set the sending socket's bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the per-datagram send timeout
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the metadata lookup timeout
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Set the discovery channel capacity (at least 1)
    pub fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the multicast DNS port
    pub fn mdns_port(mut self, port: u16) -> Self {
        self.mdns_port = port;
        self
    }

    /// Register a data pathway descriptor
    pub fn descriptor(
        mut self,
        reference: impl Into<DescriptorRef>,
        tag: impl Into<PayloadTypeTag>,
    ) -> Self {
        self.descriptors.insert(reference.into(), tag.into());
        self
    }
}
