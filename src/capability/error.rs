//! Capability matching errors

use super::tag::DescriptorRef;

/// Why a service's capability could not be determined
///
/// Never fatal: the service is skipped and will not be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// Neither a direct tag nor a descriptor reference was advertised
    MissingCapabilityInfo,
    /// The advertised descriptor reference is not known
    UnresolvedDescriptor(DescriptorRef),
}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityError::MissingCapabilityInfo => {
                write!(f, "Missing capability info (no type or pathway entry)")
            }
            CapabilityError::UnresolvedDescriptor(reference) => {
                write!(f, "Unresolved data pathway descriptor: {}", reference)
            }
        }
    }
}

impl std::error::Error for CapabilityError {}
