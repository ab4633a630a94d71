use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Document, DocumentId, TagSuggestion};

/// A request sent by the panel, dispatched on its `name` field.
///
/// # Examples
///
/// ```
/// use tagwise::host::HostMessage;
///
/// let message: HostMessage =
///     serde_json::from_str(r#"{"name":"suggestTags","noteContent":"Q3 budget"}"#).unwrap();
/// assert!(matches!(message, HostMessage::SuggestTags { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum HostMessage {
    /// The panel finished loading and wants its initial data.
    WebviewReady,
    /// The panel asks for the stored Gemini key.
    GetApiKey,
    /// The user accepted tags for a document.
    ApplyTags {
        #[serde(rename = "noteId", default)]
        note_id: Option<DocumentId>,
        #[serde(default)]
        tags: Option<Vec<Value>>,
    },
    /// The panel asks for the selected document again.
    RequestCurrentNote,
    /// Liveness probe.
    Ping,
    /// Suggest tags for the given document text.
    SuggestTags {
        #[serde(rename = "noteContent", default)]
        note_content: Option<String>,
    },
}

/// Reply to a [`HostMessage`] that expects an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostReply {
    ApiKey(String),
    Pong(PongReply),
    Suggestion(TagSuggestion),
}

/// Body of the liveness probe reply: `{"name": "pong"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PongReply {
    pub name: String,
}

impl HostReply {
    pub fn pong() -> Self {
        Self::Pong(PongReply {
            name: "pong".to_string(),
        })
    }
}

/// An update pushed to the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum PanelMessage {
    /// The selected document changed or was refreshed. `None` when nothing
    /// is selected.
    NoteDataUpdate { note: Option<Document> },
    /// The host theme, forwarded verbatim.
    Theme { value: Value },
}
