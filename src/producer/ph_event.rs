//! pH sensor event payload
//!
//! Wire layout, little-endian, 16 bytes:
//!
//! ```text
//! 0        8                16
//! ┌────────┬────────────────┐
//! │ ph f64 │ timestamp u64  │
//! └────────┴────────────────┘
//! ```
//!
//! `timestamp` is nanoseconds since the Unix epoch, UTC.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::capability::PayloadTypeTag;

/// Encoded size of a [`PhEvent`]
pub const PH_EVENT_LEN: usize = 16;

/// A single pH reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhEvent {
    /// Measured pH
    pub ph: f64,
    /// Sample time in nanoseconds since the Unix epoch
    pub timestamp: u64,
}

impl PhEvent {
    /// Payload tag consumers advertise to receive pH events
    pub const TAG: PayloadTypeTag = PayloadTypeTag::from_static("PhEvent");

    pub fn new(ph: f64, timestamp: u64) -> Self {
        Self { ph, timestamp }
    }

    /// Reading stamped with the current time
    pub fn now(ph: f64) -> Self {
        Self::new(ph, timestamp_nanos())
    }

    /// Serialize into the 16-byte wire layout
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(PH_EVENT_LEN);
        buf.put_f64_le(self.ph);
        buf.put_u64_le(self.timestamp);
        buf.freeze()
    }

    /// Parse a received datagram
    pub fn decode(mut buf: &[u8]) -> Result<Self, PayloadError> {
        if buf.len() < PH_EVENT_LEN {
            return Err(PayloadError::Truncated {
                expected: PH_EVENT_LEN,
                actual: buf.len(),
            });
        }

        let ph = buf.get_f64_le();
        let timestamp = buf.get_u64_le();
        Ok(Self { ph, timestamp })
    }
}

impl std::fmt::Display for PhEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PhEvent(ph={:.2}, timestamp={})", self.ph, self.timestamp)
    }
}

/// Error decoding a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// Fewer bytes than the fixed layout requires
    Truncated { expected: usize, actual: usize },
}

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadError::Truncated { expected, actual } => {
                write!(f, "Truncated payload: expected {} bytes, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for PayloadError {}

/// Current UTC time in nanoseconds since the Unix epoch
///
/// Clocks set before 1970 read as zero.
pub fn timestamp_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let event = PhEvent::new(7.0, 1_700_000_000_000_000_000);
        let encoded = event.encode();

        assert_eq!(encoded.len(), PH_EVENT_LEN);
        assert_eq!(&encoded[..8], &7.0f64.to_le_bytes());
        assert_eq!(&encoded[8..], &1_700_000_000_000_000_000u64.to_le_bytes());
    }

    #[test]
    fn test_decode_encoded() {
        let event = PhEvent::new(6.85, 42);
        assert_eq!(PhEvent::decode(&event.encode()).unwrap(), event);
    }

    #[test]
    fn test_decode_truncated() {
        let result = PhEvent::decode(&[0u8; 10]);
        assert_eq!(
            result,
            Err(PayloadError::Truncated {
                expected: 16,
                actual: 10
            })
        );
    }

    #[test]
    fn test_now_is_recent() {
        // 2020-01-01T00:00:00Z
        let floor = 1_577_836_800_000_000_000u64;
        assert!(PhEvent::now(7.0).timestamp > floor);
    }

    #[test]
    fn test_display() {
        assert_eq!(PhEvent::new(7.0, 5).to_string(), "PhEvent(ph=7.00, timestamp=5)");
    }
}
