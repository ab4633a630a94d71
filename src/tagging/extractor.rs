//! Pulls the `{"tags": [...]}` payload out of a free-text completion.
//!
//! Models are asked for JSON only but routinely wrap it in prose or code
//! fences, so extraction is a heuristic kept behind [`ResponseExtractor`].

use serde_json::Value;
use thiserror::Error;

use super::normalizer::value_text;

/// The completion did not contain parseable JSON.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Malformed response: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Turns a raw completion into a list of suggested tags.
///
/// `Ok` with an empty list means the JSON parsed but carried no tags, which
/// is distinct from a malformed response.
pub trait ResponseExtractor: Send + Sync {
    fn extract(&self, raw: &str) -> Result<Vec<String>, ExtractError>;
}

/// Parses the span between the first `{` and the last `}`.
///
/// # Examples
///
/// ```
/// use tagwise::tagging::{BraceSpanExtractor, ResponseExtractor};
///
/// let tags = BraceSpanExtractor
///     .extract(r#"here are tags: {"tags":["a","b"]} thanks"#)
///     .unwrap();
/// assert_eq!(tags, vec!["a", "b"]);
///
/// assert!(BraceSpanExtractor.extract("not json at all").is_err());
/// assert!(BraceSpanExtractor.extract(r#"{"other":1}"#).unwrap().is_empty());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct BraceSpanExtractor;

impl ResponseExtractor for BraceSpanExtractor {
    fn extract(&self, raw: &str) -> Result<Vec<String>, ExtractError> {
        let parsed: Value =
            serde_json::from_str(json_candidate(raw)).map_err(ExtractError::Malformed)?;

        Ok(parsed
            .get("tags")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(value_text).collect())
            .unwrap_or_default())
    }
}

/// Returns the JSON object candidate inside `raw`.
///
/// Falls back to the whole text when no `{ ... }` span exists.
fn json_candidate(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => raw,
    }
}
