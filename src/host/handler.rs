use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::catalog::TagCatalog;
use crate::config::SettingsSource;
use crate::models::DocumentId;
use crate::reconciler::TagReconciler;
use crate::tagging::{TagNormalizer, TagSuggester};

use super::{Host, HostMessage, HostReply, PanelMessage};

/// Panel state owned by whoever drives the handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelState {
    /// Set once the panel reports it is ready; updates are only pushed after.
    pub ready: bool,
}

/// Dispatches panel requests to the suggester and the reconciler.
pub struct MessageHandler {
    host: Arc<dyn Host>,
    catalog: Arc<dyn TagCatalog>,
    settings: Arc<dyn SettingsSource>,
    suggester: TagSuggester,
    reconciler: TagReconciler,
}

impl MessageHandler {
    pub fn new(
        host: Arc<dyn Host>,
        catalog: Arc<dyn TagCatalog>,
        settings: Arc<dyn SettingsSource>,
        suggester: TagSuggester,
    ) -> Self {
        let reconciler = TagReconciler::new(catalog.clone());
        Self {
            host,
            catalog,
            settings,
            suggester,
            reconciler,
        }
    }

    /// Handles one panel request.
    ///
    /// Returns the reply for requests that expect one.
    ///
    /// # Errors
    ///
    /// Returns an error when the host, catalog or settings source fails.
    /// Suggestion failures are not errors; they come back as an error reply.
    pub async fn handle(
        &self,
        state: &mut PanelState,
        message: HostMessage,
    ) -> Result<Option<HostReply>> {
        match message {
            HostMessage::WebviewReady => {
                info!("panel ready, sending current document");
                state.ready = true;
                self.push_current_document().await?;
                self.push_theme().await;
                Ok(None)
            }
            HostMessage::GetApiKey => {
                let settings = self.settings.load().await?;
                let key = settings.gemini_api_key().unwrap_or_default().to_string();
                Ok(Some(HostReply::ApiKey(key)))
            }
            HostMessage::ApplyTags { note_id, tags } => {
                let tags = TagNormalizer::normalize_values(tags.as_deref().unwrap_or_default());
                info!(document_id = ?note_id, ?tags, "apply tags requested");
                self.apply_tags(note_id.as_ref(), &tags).await?;
                Ok(None)
            }
            HostMessage::RequestCurrentNote => {
                self.push_current_document().await?;
                Ok(None)
            }
            HostMessage::Ping => Ok(Some(HostReply::pong())),
            HostMessage::SuggestTags { note_content } => {
                let settings = self.settings.load().await?;
                let text = note_content.unwrap_or_default();
                let suggestion = self.suggester.suggest(&text, &settings).await;
                Ok(Some(HostReply::Suggestion(suggestion)))
            }
        }
    }

    /// Called when the host's selected document changes.
    ///
    /// Nothing is pushed until the panel has reported ready.
    pub async fn selection_changed(&self, state: &PanelState) -> Result<()> {
        if !state.ready {
            return Ok(());
        }
        self.push_current_document().await
    }

    async fn apply_tags(&self, document_id: Option<&DocumentId>, tags: &[String]) -> Result<()> {
        let report = self.reconciler.apply(document_id, tags).await;
        if !report.failed.is_empty() {
            warn!(failed = ?report.failed, "some tags were not applied");
        }
        if report.is_empty() {
            return Ok(());
        }
        self.push_current_document().await
    }

    async fn push_current_document(&self) -> Result<()> {
        let Some(document) = self.host.selected_document().await? else {
            info!("no document selected");
            return self
                .host
                .post(PanelMessage::NoteDataUpdate { note: None })
                .await;
        };

        let tags = self
            .catalog
            .document_tags(&document.id)
            .await?
            .into_iter()
            .map(|t| t.title().to_string())
            .collect();
        let document = document.with_tags(tags);
        info!(document_id = %document.id, tags = ?document.tags, "sending document to panel");

        self.host
            .post(PanelMessage::NoteDataUpdate {
                note: Some(document),
            })
            .await
    }

    async fn push_theme(&self) {
        let result = async {
            let value = self.host.theme().await?;
            self.host.post(PanelMessage::Theme { value }).await
        }
        .await;

        if let Err(e) = result {
            warn!(error = %e, "unable to push theme, panel keeps its defaults");
        }
    }
}
