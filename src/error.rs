//! Crate-wide error type
//!
//! Per-service and per-endpoint failures are contained where they happen and
//! never surface here. This type only carries failures that end an operation:
//! socket setup, discovery lifecycle, and broadcast contract violations.

use crate::broadcast::BroadcastError;
use crate::discovery::DiscoveryError;

/// Result alias used by the lifecycle API
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error
#[derive(Debug)]
pub enum Error {
    /// Socket creation or bind failed
    Io(std::io::Error),
    /// Discovery could not be started or stopped
    Discovery(DiscoveryError),
    /// A broadcast call violated its contract
    Broadcast(BroadcastError),
    /// `start()` was called on a beacon that is already running
    AlreadyRunning,
    /// The beacon was used before `start()` or after `stop()`
    NotRunning,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Discovery(e) => write!(f, "Discovery error: {}", e),
            Error::Broadcast(e) => write!(f, "Broadcast error: {}", e),
            Error::AlreadyRunning => write!(f, "Beacon is already running"),
            Error::NotRunning => write!(f, "Beacon is not running"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Discovery(e) => Some(e),
            Error::Broadcast(e) => Some(e),
            Error::AlreadyRunning | Error::NotRunning => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<DiscoveryError> for Error {
    fn from(e: DiscoveryError) -> Self {
        Error::Discovery(e)
    }
}

impl From<BroadcastError> for Error {
    fn from(e: BroadcastError) -> Self {
        Error::Broadcast(e)
    }
}
