//! Service discovery
//!
//! A [`DiscoverySource`] watches the network for consumers and emits
//! [`DiscoveryEvent`]s on a channel; the [`DiscoveryHandler`] resolves each
//! appeared service, runs the capability matcher and updates the registry.
//!
//! Two sources are provided: [`MdnsDiscovery`] for multicast DNS on the local
//! network, and [`MemoryDiscovery`] for tests and demos.

pub mod error;
pub mod event;
pub mod handler;
pub mod mdns;
pub mod memory;

pub use error::DiscoveryError;
pub use event::{DiscoveryEvent, DiscoverySource, ServiceResolver};
pub use handler::{DiscoveryHandler, HandleOutcome};
pub use mdns::{MdnsDiscovery, MdnsResolver};
pub use memory::{MemoryAnnouncer, MemoryDiscovery, MemoryResolver};

/// DNS-SD service type browsed by default
pub const DEFAULT_SERVICE_TYPE: &str = "_capnproto._udp.local.";
