use serde::{Deserialize, Serialize};

use super::Backend;

/// Which backend and model produced a set of suggested tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSource {
    pub provider: Backend,
    pub model: String,
}

impl SuggestionSource {
    pub fn new(provider: Backend, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

/// Outcome of a suggestion request.
///
/// Either a non-empty list of tags with the producing source, or a single
/// user-facing error message. Serializes as `{"tags": [...], "source": {...}}`
/// or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagSuggestion {
    Tags {
        tags: Vec<String>,
        source: SuggestionSource,
    },
    Error {
        error: String,
    },
}

impl TagSuggestion {
    /// Builds a failed suggestion from any displayable error.
    pub fn error(message: impl ToString) -> Self {
        Self::Error {
            error: message.to_string(),
        }
    }

    /// Returns the suggested tags, or `None` for an error result.
    pub fn tags(&self) -> Option<&[String]> {
        match self {
            Self::Tags { tags, .. } => Some(tags),
            Self::Error { .. } => None,
        }
    }

    /// Returns the error message, or `None` for a successful result.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Tags { .. } => None,
            Self::Error { error } => Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Tags { .. })
    }
}
