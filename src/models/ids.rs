use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a document owned by the host application.
///
/// Hosts use opaque string ids (for example 32-character hex note ids), so
/// the core never parses or generates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a document ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying ID value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the id is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a tag record in the catalog.
///
/// Wraps a catalog row ID to provide type safety and prevent accidental
/// mixing with document ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(i64);

impl TagId {
    /// Creates a new tag ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_serializes_as_raw_string() {
        let id = DocumentId::new("a1b2c3");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""a1b2c3""#);

        let deserialized: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn tag_id_serializes_as_raw_integer() {
        let id = TagId::new(99);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "99");
    }

    #[test]
    fn blank_document_ids_are_detected() {
        assert!(DocumentId::new("").is_blank());
        assert!(DocumentId::new("   ").is_blank());
        assert!(!DocumentId::new("n1").is_blank());
    }
}
