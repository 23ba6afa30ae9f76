//! Broadcast error types

use std::io;

use crate::capability::PayloadTypeTag;
use crate::registry::Endpoint;

/// Error returned from a broadcast call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    /// The payload's tag is not the one this broadcaster was built for
    TypeMismatch {
        expected: PayloadTypeTag,
        actual: PayloadTypeTag,
    },
}

impl std::fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BroadcastError::TypeMismatch { expected, actual } => write!(
                f,
                "Payload type mismatch: expected {}, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for BroadcastError {}

/// A datagram that could not be handed to the transport
///
/// Reported per endpoint; never aborts the rest of a broadcast.
#[derive(Debug)]
pub struct SendFailure {
    pub endpoint: Endpoint,
    pub error: io::Error,
}

impl std::fmt::Display for SendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Send to {} failed: {}", self.endpoint, self.error)
    }
}

impl std::error::Error for SendFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
