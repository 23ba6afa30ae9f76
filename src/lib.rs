//! Discovery-driven fan-out of sensor events
//!
//! Consumers advertise themselves on the local network with multicast DNS,
//! naming the payload type they accept in a TXT record. This crate watches
//! for them, keeps a live registry of the endpoints whose payload type
//! matches, and sends every produced reading to all of them as a UDP
//! datagram.
//!
//! ```text
//!   mDNS ──► DiscoverySource ──► DiscoveryHandler ──► CapabilityMatcher
//!                                       │
//!                                       ▼
//!   PayloadSource ──► Broadcaster ◄── EndpointRegistry
//!                          │
//!                          └──► UDP ──► consumers
//! ```
//!
//! [`Beacon`] ties the pieces together behind `start()`/`stop()`.

pub mod beacon;
pub mod broadcast;
pub mod capability;
pub mod discovery;
pub mod error;
pub mod producer;
pub mod registry;
pub mod stats;

pub use beacon::{Beacon, BeaconConfig};
pub use broadcast::{BroadcastError, Broadcaster};
pub use capability::{CapabilityMatcher, PayloadTypeTag, ServiceMetadata};
pub use discovery::{DiscoveryEvent, DiscoveryHandler, MdnsDiscovery, MemoryDiscovery};
pub use error::{Error, Result};
pub use producer::{PayloadSource, PhEvent, PhEventSource};
pub use registry::{Endpoint, EndpointRegistry, ServiceName};
