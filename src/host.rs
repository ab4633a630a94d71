//! Message surface between the tag panel and the core.
//!
//! The panel sends [`HostMessage`] requests; the core answers some of them
//! with a [`HostReply`] and pushes [`PanelMessage`] updates through a
//! [`Host`]. Panel readiness lives in a caller-owned [`PanelState`] rather
//! than in process-wide state.

mod handler;
mod local;
mod messages;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::models::Document;

pub use handler::{MessageHandler, PanelState};
pub use local::{LocalHost, run_bridge};
pub use messages::{HostMessage, HostReply, PanelMessage, PongReply};

/// The application hosting the tag panel.
#[async_trait]
pub trait Host: Send + Sync {
    /// The document currently selected by the user, if any.
    ///
    /// The returned document's `tags` may be empty; the handler fills them
    /// from the catalog.
    async fn selected_document(&self) -> Result<Option<Document>>;

    /// The host's current theme value, forwarded to the panel verbatim.
    async fn theme(&self) -> Result<Value>;

    /// Pushes a message to the panel.
    async fn post(&self, message: PanelMessage) -> Result<()>;
}
