//! Tag suggestion and canonicalization.
//!
//! [`TagSuggester`] asks an LLM backend for exactly five tags and returns
//! them verbatim. [`TagNormalizer`] canonicalizes tags when they are
//! applied to a document, and [`ResponseExtractor`] isolates the JSON
//! parsing heuristic used on raw completions.
//!
//! # Examples
//!
//! ```no_run
//! use tagwise::config::Settings;
//! use tagwise::tagging::{TagNormalizer, TagSuggester};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let suggester = TagSuggester::from_env()?;
//! let result = suggester
//!     .suggest("Learning async Rust with tokio", &Settings::from_env())
//!     .await;
//!
//! if let Some(tags) = result.tags() {
//!     let canonical = TagNormalizer::normalize_tags(tags);
//!     println!("{}", canonical.join(", "));
//! }
//! # Ok(())
//! # }
//! ```

mod extractor;
mod normalizer;
mod prompt;
mod suggester;

pub use extractor::{BraceSpanExtractor, ExtractError, ResponseExtractor};
pub use normalizer::TagNormalizer;
pub use prompt::{JSON_ONLY_SYSTEM_PROMPT, REQUESTED_TAG_COUNT, build_prompt, tags_response_schema};
pub use suggester::{DEFAULT_GEMINI_MODELS, SuggestError, TagSuggester, select_backend};
