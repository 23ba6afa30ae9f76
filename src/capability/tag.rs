//! Payload type tags and descriptor references

use std::fmt;

use bytes::Bytes;

/// Identifier of a payload schema, e.g. `PhEvent`
///
/// Compared byte-for-byte. There is no prefix or wildcard matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PayloadTypeTag(Bytes);

impl PayloadTypeTag {
    /// Create a tag from a static string
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Bytes::from_static(tag.as_bytes()))
    }

    /// Create a tag from raw bytes
    pub fn from_bytes(tag: impl Into<Bytes>) -> Self {
        Self(tag.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for PayloadTypeTag {
    fn from(tag: &str) -> Self {
        Self(Bytes::copy_from_slice(tag.as_bytes()))
    }
}

impl From<String> for PayloadTypeTag {
    fn from(tag: String) -> Self {
        Self(Bytes::from(tag))
    }
}

impl fmt::Display for PayloadTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Reference to a data pathway descriptor that names a payload tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorRef(Bytes);

impl DescriptorRef {
    pub fn from_bytes(reference: impl Into<Bytes>) -> Self {
        Self(reference.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for DescriptorRef {
    fn from(reference: &str) -> Self {
        Self(Bytes::copy_from_slice(reference.as_bytes()))
    }
}

impl fmt::Display for DescriptorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_equality_is_exact() {
        let tag = PayloadTypeTag::from_static("PhEvent");

        assert_eq!(tag, PayloadTypeTag::from("PhEvent"));
        assert_ne!(tag, PayloadTypeTag::from("PhEv"));
        assert_ne!(tag, PayloadTypeTag::from("phevent"));
        assert_ne!(tag, PayloadTypeTag::from("PhEvent2"));
    }

    #[test]
    fn test_tag_display_non_utf8() {
        let tag = PayloadTypeTag::from_bytes(vec![0x50, 0xFF]);
        assert_eq!(tag.to_string(), "P\u{FFFD}");
    }
}
