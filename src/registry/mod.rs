//! Endpoint registry for discovered consumers
//!
//! The registry is the only state shared between the discovery watch and the
//! broadcast loop.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<EndpointRegistry>
//!                   ┌───────────────────────────┐
//!                   │ endpoints: RwLock<HashMap< │
//!                   │   ServiceName, Endpoint>>  │
//!                   └─────────────┬─────────────┘
//!                                 │
//!            ┌────────────────────┴────────────────────┐
//!            │                                         │
//!            ▼                                         ▼
//!   [DiscoveryHandler]                           [Broadcaster]
//!   put() / remove()                             snapshot()
//!     ▲                                                │
//!     └── mDNS appeared/vanished         send_to() ──► UDP
//! ```
//!
//! `snapshot()` copies the endpoints out under a read lock and releases it
//! before any datagram is sent.

pub mod entry;
pub mod store;

pub use entry::{Endpoint, ServiceName};
pub use store::EndpointRegistry;
