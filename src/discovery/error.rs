//! Discovery error types

use crate::registry::ServiceName;

/// Errors raised by discovery sources and metadata resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The discovery daemon could not be created
    DaemonFailed(String),
    /// Browsing for the service type could not be started
    BrowseFailed(String),
    /// Browsing could not be stopped
    StopBrowseFailed(String),
    /// Metadata for a service could not be looked up (or timed out)
    ResolutionFailed(ServiceName),
    /// Resolved metadata did not carry any address
    NoAddress(ServiceName),
    /// The source was used before `start()` or its consumer went away
    NotStarted,
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::DaemonFailed(msg) => {
                write!(f, "Failed to create discovery daemon: {}", msg)
            }
            DiscoveryError::BrowseFailed(msg) => write!(f, "Failed to start browsing: {}", msg),
            DiscoveryError::StopBrowseFailed(msg) => write!(f, "Failed to stop browsing: {}", msg),
            DiscoveryError::ResolutionFailed(name) => {
                write!(f, "Failed to resolve service metadata: {}", name)
            }
            DiscoveryError::NoAddress(name) => write!(f, "Service has no address: {}", name),
            DiscoveryError::NotStarted => write!(f, "Discovery is not running"),
        }
    }
}

impl std::error::Error for DiscoveryError {}
