pub mod catalog;
pub mod config;
pub mod db;
pub mod host;
pub mod llm;
pub mod models;
pub mod reconciler;
pub mod tagging;

pub use catalog::TagCatalog;
pub use config::{EnvSettings, FixedSettings, Settings, SettingsBuilder, SettingsSource};
pub use db::Database;
pub use models::{
    Backend, Document, DocumentId, SuggestionSource, TagId, TagRecord, TagSuggestion,
};
pub use reconciler::{Reconciliation, TagReconciler};
pub use tagging::{TagNormalizer, TagSuggester};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_accessible_from_crate_root() {
        let db = Database::in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn types_accessible_from_crate_root() {
        let record = TagRecord::new(TagId::new(1), "Budget");
        assert!(record.matches_title("budget"));

        assert_eq!(Backend::parse("OpenRouter"), Some(Backend::OpenRouter));
        assert_eq!(TagNormalizer::normalize_tag("  Q3 "), "q3");

        let suggestion = TagSuggestion::error("Gemini API key missing");
        assert!(!suggestion.is_success());
    }
}
