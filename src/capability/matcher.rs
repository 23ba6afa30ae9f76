//! Capability matching
//!
//! Decides whether a discovered service accepts the payload type this
//! process produces. A service advertises its capability in one of two ways:
//!
//! - `type=<tag>`: names the accepted payload tag directly
//! - `pathway=<reference>`: names a data pathway descriptor, which is looked
//!   up in a [`DescriptorTable`] to find the tag
//!
//! A direct tag wins when both are present.

use std::collections::HashMap;

use super::error::CapabilityError;
use super::metadata::ServiceMetadata;
use super::tag::{DescriptorRef, PayloadTypeTag};

/// TXT key carrying a direct payload tag
pub const TYPE_KEY: &str = "type";

/// TXT key carrying a data pathway descriptor reference
pub const PATHWAY_KEY: &str = "pathway";

/// Capability advertised by a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// The service names its payload tag directly
    DirectTag(PayloadTypeTag),
    /// The service names a descriptor that must be resolved first
    IndirectDescriptor(DescriptorRef),
}

impl Capability {
    /// Extract the advertised capability from discovery metadata
    pub fn from_metadata(metadata: &ServiceMetadata) -> Result<Self, CapabilityError> {
        if let Some(tag) = metadata.get(TYPE_KEY) {
            return Ok(Capability::DirectTag(PayloadTypeTag::from_bytes(tag.clone())));
        }

        if let Some(reference) = metadata.get(PATHWAY_KEY) {
            return Ok(Capability::IndirectDescriptor(DescriptorRef::from_bytes(
                reference.clone(),
            )));
        }

        Err(CapabilityError::MissingCapabilityInfo)
    }
}

/// Known data pathway descriptors and the payload tag each one carries
#[derive(Debug, Clone, Default)]
pub struct DescriptorTable {
    entries: HashMap<DescriptorRef, PayloadTypeTag>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor
    pub fn insert(&mut self, reference: DescriptorRef, tag: PayloadTypeTag) {
        self.entries.insert(reference, tag);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(
        mut self,
        reference: impl Into<DescriptorRef>,
        tag: impl Into<PayloadTypeTag>,
    ) -> Self {
        self.insert(reference.into(), tag.into());
        self
    }

    pub fn lookup(&self, reference: &DescriptorRef) -> Option<&PayloadTypeTag> {
        self.entries.get(reference)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Matches discovery metadata against an expected payload tag
#[derive(Debug, Clone, Default)]
pub struct CapabilityMatcher {
    descriptors: DescriptorTable,
}

impl CapabilityMatcher {
    /// Matcher with no descriptors; only direct tags can match
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descriptors(descriptors: DescriptorTable) -> Self {
        Self { descriptors }
    }

    pub fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    /// Resolve the payload tag a service accepts
    pub fn resolve(&self, capability: &Capability) -> Result<PayloadTypeTag, CapabilityError> {
        match capability {
            Capability::DirectTag(tag) => Ok(tag.clone()),
            Capability::IndirectDescriptor(reference) => self
                .descriptors
                .lookup(reference)
                .cloned()
                .ok_or_else(|| CapabilityError::UnresolvedDescriptor(reference.clone())),
        }
    }

    /// Whether the service described by `metadata` accepts `expected`
    ///
    /// Fails instead of returning `false` when the metadata does not carry
    /// enough information to decide.
    pub fn matches(
        &self,
        metadata: &ServiceMetadata,
        expected: &PayloadTypeTag,
    ) -> Result<bool, CapabilityError> {
        let capability = Capability::from_metadata(metadata)?;
        let accepted = self.resolve(&capability)?;
        Ok(accepted == *expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PH_EVENT: PayloadTypeTag = PayloadTypeTag::from_static("PhEvent");

    #[test]
    fn test_direct_tag_match() {
        let matcher = CapabilityMatcher::new();
        let metadata = ServiceMetadata::new(9000).property(TYPE_KEY, "PhEvent");

        assert!(matcher.matches(&metadata, &PH_EVENT).unwrap());
    }

    #[test]
    fn test_direct_tag_mismatch() {
        let matcher = CapabilityMatcher::new();
        let metadata = ServiceMetadata::new(9000).property(TYPE_KEY, "TemperatureEvent");

        assert!(!matcher.matches(&metadata, &PH_EVENT).unwrap());
    }

    #[test]
    fn test_prefix_does_not_match() {
        let matcher = CapabilityMatcher::new();
        let metadata = ServiceMetadata::new(9000).property(TYPE_KEY, "PhEventV2");

        assert!(!matcher.matches(&metadata, &PH_EVENT).unwrap());
    }

    #[test]
    fn test_missing_capability_info() {
        let matcher = CapabilityMatcher::new();
        let metadata = ServiceMetadata::new(9000).property("version", "1");

        let result = matcher.matches(&metadata, &PH_EVENT);
        assert_eq!(result, Err(CapabilityError::MissingCapabilityInfo));
    }

    #[test]
    fn test_indirect_descriptor_match() {
        let descriptors = DescriptorTable::new().with("water-quality", "PhEvent");
        let matcher = CapabilityMatcher::with_descriptors(descriptors);
        let metadata = ServiceMetadata::new(9000).property(PATHWAY_KEY, "water-quality");

        assert!(matcher.matches(&metadata, &PH_EVENT).unwrap());
    }

    #[test]
    fn test_indirect_descriptor_mismatch() {
        let descriptors = DescriptorTable::new().with("air-quality", "Co2Event");
        let matcher = CapabilityMatcher::with_descriptors(descriptors);
        let metadata = ServiceMetadata::new(9000).property(PATHWAY_KEY, "air-quality");

        assert!(!matcher.matches(&metadata, &PH_EVENT).unwrap());
    }

    #[test]
    fn test_unresolved_descriptor() {
        let matcher = CapabilityMatcher::new();
        let metadata = ServiceMetadata::new(9000).property(PATHWAY_KEY, "unknown");

        let result = matcher.matches(&metadata, &PH_EVENT);
        assert_eq!(
            result,
            Err(CapabilityError::UnresolvedDescriptor(DescriptorRef::from("unknown")))
        );
    }

    #[test]
    fn test_direct_tag_wins() {
        let descriptors = DescriptorTable::new().with("water-quality", "PhEvent");
        let matcher = CapabilityMatcher::with_descriptors(descriptors);
        let metadata = ServiceMetadata::new(9000)
            .property(TYPE_KEY, "Co2Event")
            .property(PATHWAY_KEY, "water-quality");

        assert_eq!(
            Capability::from_metadata(&metadata).unwrap(),
            Capability::DirectTag(PayloadTypeTag::from("Co2Event"))
        );
        assert!(!matcher.matches(&metadata, &PH_EVENT).unwrap());
    }
}
