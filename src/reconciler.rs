//! Applies accepted tags to a document through the tag catalog.
//!
//! Tags are normalized, resolved to existing catalog records by exact
//! case-insensitive title (or created), and linked to the document. Lookups
//! run concurrently, then links run concurrently. Nothing is rolled back: a
//! partial failure leaves the tags that did succeed linked, and the failures
//! are only logged and reported.

use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::catalog::TagCatalog;
use crate::models::{DocumentId, TagRecord};
use crate::tagging::TagNormalizer;

/// Summary of one `apply` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Records now linked to the document, in canonical tag order.
    pub linked: Vec<TagRecord>,
    /// Canonical tags that could not be resolved or linked.
    pub failed: Vec<String>,
}

impl Reconciliation {
    /// `true` when nothing was attempted or nothing succeeded.
    pub fn is_empty(&self) -> bool {
        self.linked.is_empty()
    }
}

/// Resolves canonical tags against a catalog and links them to documents.
pub struct TagReconciler {
    catalog: Arc<dyn TagCatalog>,
}

impl TagReconciler {
    pub fn new(catalog: Arc<dyn TagCatalog>) -> Self {
        Self { catalog }
    }

    /// Applies raw tag titles to a document.
    ///
    /// Does nothing when `document_id` is missing or blank, or when no tag
    /// survives normalization. This is routinely called with unchecked
    /// input, so those cases are logged rather than treated as errors.
    pub async fn apply<S: AsRef<str>>(
        &self,
        document_id: Option<&DocumentId>,
        tags: &[S],
    ) -> Reconciliation {
        let Some(document_id) = document_id.filter(|id| !id.is_blank()) else {
            warn!("no document id given, skipping tag application");
            return Reconciliation::default();
        };

        let canonical = TagNormalizer::normalize_tags(tags);
        info!(document_id = %document_id, tags = ?canonical, "applying tags");
        if canonical.is_empty() {
            warn!(document_id = %document_id, "no valid tags to apply");
            return Reconciliation::default();
        }

        let resolved = join_all(canonical.iter().map(|tag| self.resolve(tag))).await;

        let mut report = Reconciliation::default();
        let mut to_link = Vec::new();
        for (tag, outcome) in canonical.iter().zip(resolved) {
            match outcome {
                Ok(record) => to_link.push(record),
                Err(e) => {
                    error!(tag = %tag, error = %e, "failed to resolve tag");
                    report.failed.push(tag.clone());
                }
            }
        }

        let links = join_all(to_link.iter().map(|record| {
            debug!(tag_id = %record.id(), document_id = %document_id, "linking tag");
            self.catalog.link_tag_to_document(record.id(), document_id)
        }))
        .await;

        for (record, outcome) in to_link.into_iter().zip(links) {
            match outcome {
                Ok(()) => report.linked.push(record),
                Err(e) => {
                    error!(
                        tag = record.title(),
                        document_id = %document_id,
                        error = %e,
                        "failed to link tag"
                    );
                    report.failed.push(record.title().to_lowercase());
                }
            }
        }

        report
    }

    /// Finds the catalog record whose title equals `tag` ignoring case, or
    /// creates one.
    async fn resolve(&self, tag: &str) -> Result<TagRecord> {
        let candidates = self.catalog.find_by_title_query(tag).await?;
        if let Some(existing) = candidates.into_iter().find(|t| t.matches_title(tag)) {
            debug!(tag, id = %existing.id(), "found existing tag");
            return Ok(existing);
        }

        let created = self.catalog.create_tag(tag).await?;
        info!(tag, id = %created.id(), "created tag");
        Ok(created)
    }
}
