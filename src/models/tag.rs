use serde::{Deserialize, Serialize};

use super::TagId;

/// A tag as stored in the catalog.
///
/// Records are owned by the catalog. The core only reads them to decide
/// between reusing an existing tag and creating a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    id: TagId,
    title: String,
}

impl TagRecord {
    /// Creates a tag record.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwise::{TagId, TagRecord};
    ///
    /// let tag = TagRecord::new(TagId::new(1), "budget");
    /// assert_eq!(tag.id(), TagId::new(1));
    /// assert_eq!(tag.title(), "budget");
    /// ```
    pub fn new(id: TagId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    /// Returns the catalog identifier.
    pub fn id(&self) -> TagId {
        self.id
    }

    /// Returns the title exactly as the catalog holds it.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether this record's title equals `canonical` ignoring case.
    ///
    /// `canonical` is expected to be already lowercased.
    pub fn matches_title(&self, canonical: &str) -> bool {
        self.title.to_lowercase() == canonical
    }
}
