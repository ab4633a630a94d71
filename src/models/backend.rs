use serde::{Deserialize, Serialize};
use std::fmt;

/// The LLM backend used to produce tag suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Google Gemini, tried across a prioritized list of models.
    Gemini,
    /// OpenRouter chat completions with a single configured model.
    OpenRouter,
}

impl Backend {
    /// Parses a configured provider value.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Returns `None` for blank or unrecognized values (for example the
    /// legacy `huggingface` setting).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "openrouter" => Some(Self::OpenRouter),
            _ => None,
        }
    }

    /// Human-readable name used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenRouter => "OpenRouter",
        }
    }

    /// Stable lowercase name of the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_serializes_to_lowercase_json() {
        assert_eq!(serde_json::to_string(&Backend::Gemini).unwrap(), r#""gemini""#);
        assert_eq!(
            serde_json::to_string(&Backend::OpenRouter).unwrap(),
            r#""openrouter""#
        );
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Backend::parse("Gemini"), Some(Backend::Gemini));
        assert_eq!(Backend::parse(" OPENROUTER "), Some(Backend::OpenRouter));
    }

    #[test]
    fn parse_rejects_legacy_and_blank_values() {
        assert_eq!(Backend::parse("huggingface"), None);
        assert_eq!(Backend::parse(""), None);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", Backend::OpenRouter), "openrouter");
    }
}
