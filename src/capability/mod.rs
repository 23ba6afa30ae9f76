//! Capability matching for discovered services
//!
//! A discovered service is an eligible receiver only if its advertised
//! payload tag equals the tag this process broadcasts.

pub mod error;
pub mod matcher;
pub mod metadata;
pub mod tag;

pub use error::CapabilityError;
pub use matcher::{Capability, CapabilityMatcher, DescriptorTable, PATHWAY_KEY, TYPE_KEY};
pub use metadata::ServiceMetadata;
pub use tag::{DescriptorRef, PayloadTypeTag};
