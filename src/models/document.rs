use serde::{Deserialize, Serialize};

use super::DocumentId;

/// A document as presented to the tag panel.
///
/// `tags` holds the titles currently linked to the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Document {
    /// Creates a document with no tags.
    pub fn new(id: DocumentId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    /// Replaces the tag titles attached to this document.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}
