//! Payload fan-out over datagrams
//!
//! One datagram per registered endpoint per broadcast call. Nothing is read
//! back, nothing is retried, and there is no ordering between endpoints.

pub mod error;
pub mod sender;
pub mod transport;

pub use error::{BroadcastError, SendFailure};
pub use sender::{Broadcaster, SendReport};
pub use transport::{DatagramTransport, UdpTransport};
