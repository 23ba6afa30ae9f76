//! Sensor event production
//!
//! The broadcast loop pulls one payload per tick from a [`PayloadSource`].

pub mod ph_event;
pub mod source;

pub use ph_event::{timestamp_nanos, PayloadError, PhEvent, PH_EVENT_LEN};
pub use source::{PayloadSource, PhEventSource};
