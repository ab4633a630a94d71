use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, warn};

use crate::db::Database;
use crate::models::{Document, DocumentId};

use super::{Host, HostMessage, MessageHandler, PanelMessage, PanelState};

/// A [`Host`] backed by the local catalog that writes panel traffic as JSON
/// lines.
pub struct LocalHost<W: Write + Send> {
    db: Arc<Database>,
    document: Mutex<Option<DocumentId>>,
    theme: Value,
    out: Mutex<W>,
}

impl<W: Write + Send> LocalHost<W> {
    pub fn new(db: Arc<Database>, document: Option<DocumentId>, out: W) -> Self {
        Self {
            db,
            document: Mutex::new(document),
            theme: json!("default"),
            out: Mutex::new(out),
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Value) -> Self {
        self.theme = theme;
        self
    }

    /// Changes the selected document. `None` clears the selection.
    pub fn select(&self, document: Option<DocumentId>) -> Result<()> {
        let mut selected = self
            .document
            .lock()
            .map_err(|_| anyhow!("selection lock poisoned"))?;
        *selected = document.filter(|id| !id.is_blank());
        Ok(())
    }

    fn selected_id(&self) -> Result<Option<DocumentId>> {
        let selected = self
            .document
            .lock()
            .map_err(|_| anyhow!("selection lock poisoned"))?;
        Ok(selected.clone())
    }

    /// Writes one value as a single JSON line and flushes.
    pub fn write_line<T: Serialize>(&self, value: &T) -> Result<()> {
        let line = serde_json::to_string(value)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow!("bridge output lock poisoned"))?;
        writeln!(out, "{line}").context("Failed to write bridge output")?;
        out.flush().context("Failed to flush bridge output")?;
        Ok(())
    }

    /// Consumes the host and returns the writer.
    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|_| anyhow!("bridge output lock poisoned"))
    }
}

#[async_trait]
impl<W: Write + Send> Host for LocalHost<W> {
    async fn selected_document(&self) -> Result<Option<Document>> {
        let Some(id) = self.selected_id()? else {
            return Ok(None);
        };
        let document = self.db.get_document(&id)?;
        if document.is_none() {
            warn!(document_id = %id, "selected document is not in the catalog");
        }
        Ok(document)
    }

    async fn theme(&self) -> Result<Value> {
        Ok(self.theme.clone())
    }

    async fn post(&self, message: PanelMessage) -> Result<()> {
        self.write_line(&message)
    }
}

/// One line of bridge input: a panel request, or a selection change made in
/// the host (`{"select": "doc-id"}`, `{"select": null}` to clear).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BridgeInput {
    Message(HostMessage),
    // `Value` rather than `Option` so a line without `select` does not match.
    Select { select: Value },
}

/// Runs the panel protocol over line-delimited JSON until `input` ends.
///
/// Each input line is a [`HostMessage`] or a `select` line. Panel updates
/// are written as they happen; a reply, when there is one, follows as
/// `{"reply": ...}`. Lines that do not parse are logged and skipped.
pub async fn run_bridge<W, R>(
    handler: &MessageHandler,
    host: &LocalHost<W>,
    input: R,
) -> Result<()>
where
    W: Write + Send,
    R: AsyncBufRead + Unpin,
{
    let mut state = PanelState::default();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read bridge input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message = match serde_json::from_str(line) {
            Ok(BridgeInput::Message(message)) => message,
            Ok(BridgeInput::Select { select }) => {
                let selection = match select {
                    Value::Null => None,
                    Value::String(id) => Some(DocumentId::new(id)),
                    other => {
                        warn!(value = %other, "skipping selection that is not a document id");
                        continue;
                    }
                };
                debug!(document_id = ?selection, "selection changed");
                host.select(selection)?;
                if let Err(e) = handler.selection_changed(&state).await {
                    error!(error = %e, "failed to push selection change");
                }
                continue;
            }
            Err(e) => {
                warn!(error = %e, "skipping unrecognized bridge message");
                continue;
            }
        };
        debug!(?message, "bridge message");

        match handler.handle(&mut state, message).await {
            Ok(Some(reply)) => host.write_line(&json!({ "reply": reply }))?,
            Ok(None) => {}
            Err(e) => error!(error = %e, "bridge message failed"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TagCatalog;

    fn host_with_document() -> (LocalHost<Vec<u8>>, Arc<Database>) {
        let db = Arc::new(Database::in_memory().unwrap());
        let id = DocumentId::new("doc-1");
        db.upsert_document(&Document::new(id.clone(), "Q3", "Budget planning"))
            .unwrap();
        (LocalHost::new(db.clone(), Some(id), Vec::new()), db)
    }

    fn written_lines(host: LocalHost<Vec<u8>>) -> Vec<Value> {
        let bytes = host.into_inner().unwrap();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn selected_document_comes_from_catalog() {
        let (host, db) = host_with_document();
        let tag = db.create_tag("budget").await.unwrap();
        db.link_tag_to_document(tag.id(), &DocumentId::new("doc-1"))
            .await
            .unwrap();

        let document = host.selected_document().await.unwrap().unwrap();
        assert_eq!(document.title, "Q3");
        assert_eq!(document.tags, vec!["budget"]);
    }

    #[tokio::test]
    async fn unknown_selection_yields_none() {
        let db = Arc::new(Database::in_memory().unwrap());
        let host = LocalHost::new(db, Some(DocumentId::new("missing")), Vec::new());

        assert!(host.selected_document().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn select_replaces_and_clears_the_selection() {
        let (host, db) = host_with_document();
        db.upsert_document(&Document::new(DocumentId::new("doc-2"), "Trip", "Lisbon"))
            .unwrap();

        host.select(Some(DocumentId::new("doc-2"))).unwrap();
        let document = host.selected_document().await.unwrap().unwrap();
        assert_eq!(document.title, "Trip");

        host.select(Some(DocumentId::new("  "))).unwrap();
        assert!(host.selected_document().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn post_writes_one_json_line_per_message() {
        let (host, _db) = host_with_document();
        let host = host.with_theme(json!(3));

        host.post(PanelMessage::Theme { value: json!(3) })
            .await
            .unwrap();
        host.post(PanelMessage::NoteDataUpdate { note: None })
            .await
            .unwrap();

        assert_eq!(
            written_lines(host),
            vec![
                json!({ "name": "theme", "value": 3 }),
                json!({ "name": "noteDataUpdate", "note": null }),
            ]
        );
    }
}
