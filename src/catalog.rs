//! The tag catalog the reconciler writes to.
//!
//! The catalog is owned outside the core and may be modified concurrently by
//! other clients, so callers re-query by title instead of caching ids.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{DocumentId, TagId, TagRecord};

/// Tag storage and document association operations.
#[async_trait]
pub trait TagCatalog: Send + Sync {
    /// Returns tags whose title contains `query`, ignoring case.
    ///
    /// This is a search, not an exact lookup: callers filter for the exact
    /// title they need.
    async fn find_by_title_query(&self, query: &str) -> Result<Vec<TagRecord>>;

    /// Creates a tag with the given title and returns the stored record.
    async fn create_tag(&self, title: &str) -> Result<TagRecord>;

    /// Links a tag to a document. Linking an already linked pair succeeds
    /// without creating a duplicate.
    async fn link_tag_to_document(&self, tag_id: TagId, document_id: &DocumentId) -> Result<()>;

    /// Returns the tags linked to a document.
    async fn document_tags(&self, document_id: &DocumentId) -> Result<Vec<TagRecord>>;
}
