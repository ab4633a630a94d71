use std::collections::HashSet;

use serde_json::Value;

/// Canonicalizes suggested tags before they reach the catalog.
///
/// A canonical tag is trimmed, lowercased and non-empty. Collections are
/// deduplicated keeping the first occurrence of each value.
pub struct TagNormalizer;

impl TagNormalizer {
    /// Normalizes a single tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwise::tagging::TagNormalizer;
    ///
    /// assert_eq!(TagNormalizer::normalize_tag("  Project "), "project");
    /// assert_eq!(TagNormalizer::normalize_tag("Machine Learning"), "machine learning");
    /// assert_eq!(TagNormalizer::normalize_tag("   "), "");
    /// ```
    #[must_use]
    pub fn normalize_tag(tag: &str) -> String {
        tag.trim().to_lowercase()
    }

    /// Normalizes a collection of tags, removing duplicates and empty strings.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwise::tagging::TagNormalizer;
    ///
    /// let tags = ["Project", "project", " PROJECT ", "Budget"];
    /// assert_eq!(TagNormalizer::normalize_tags(tags), vec!["project", "budget"]);
    /// ```
    #[must_use]
    pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        tags.into_iter()
            .map(|tag| Self::normalize_tag(tag.as_ref()))
            .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
            .collect()
    }

    /// Normalizes loosely typed tag values received from a host.
    ///
    /// Strings are used as-is, numbers and booleans by their text form.
    /// `null`, arrays and objects are skipped.
    #[must_use]
    pub fn normalize_values(values: &[Value]) -> Vec<String> {
        Self::normalize_tags(values.iter().filter_map(value_text))
    }
}

/// Text form of a scalar JSON value, `None` for anything else.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_lowercase_conversion() {
        assert_eq!(TagNormalizer::normalize_tag("RUST"), "rust");
        assert_eq!(TagNormalizer::normalize_tag("RuSt"), "rust");
        assert_eq!(TagNormalizer::normalize_tag("rust"), "rust");
    }

    #[test]
    fn test_inner_characters_are_kept() {
        assert_eq!(TagNormalizer::normalize_tag("Q3 Budget"), "q3 budget");
        assert_eq!(TagNormalizer::normalize_tag("c++"), "c++");
        assert_eq!(TagNormalizer::normalize_tag("project-management"), "project-management");
    }

    #[test]
    fn test_cjk_tags_pass_through() {
        assert_eq!(TagNormalizer::normalize_tag(" 预算 "), "预算");
    }

    #[test]
    fn test_deduplication_case_insensitive() {
        let tags = vec!["Project", "project", " PROJECT "];
        assert_eq!(TagNormalizer::normalize_tags(tags), vec!["project"]);
    }

    #[test]
    fn test_empty_strings_filtered() {
        let tags = vec!["rust", "   ", "ai", "", "\t\n"];
        assert_eq!(TagNormalizer::normalize_tags(tags), vec!["rust", "ai"]);
    }

    #[test]
    fn test_preserve_order_of_first_occurrence() {
        let tags = vec!["Rust", "AI", "rust", "Web"];
        assert_eq!(TagNormalizer::normalize_tags(tags), vec!["rust", "ai", "web"]);
    }

    #[test]
    fn test_normalize_values_coerces_scalars_and_skips_null() {
        let values = vec![
            json!("Meeting"),
            json!(null),
            json!(2024),
            json!(true),
            json!(["nested"]),
            json!({ "title": "obj" }),
            json!("meeting"),
        ];

        assert_eq!(
            TagNormalizer::normalize_values(&values),
            vec!["meeting", "2024", "true"]
        );
    }

    fn tag_strategy() -> impl Strategy<Value = String> {
        "[ \t]{0,2}[a-zA-Z0-9\u{4e00}-\u{4e20} -]{0,10}[ \t]{0,2}"
    }

    proptest! {
        #[test]
        fn output_has_no_case_insensitive_duplicates(tags in prop::collection::vec(tag_strategy(), 0..20)) {
            let out = TagNormalizer::normalize_tags(&tags);
            let lowered: HashSet<String> = out.iter().map(|t| t.to_lowercase()).collect();
            prop_assert_eq!(lowered.len(), out.len());
        }

        #[test]
        fn output_never_contains_blank_entries(tags in prop::collection::vec(tag_strategy(), 0..20)) {
            let out = TagNormalizer::normalize_tags(&tags);
            prop_assert!(out.iter().all(|t| !t.is_empty() && t.trim() == t));
        }

        #[test]
        fn normalization_is_idempotent(tags in prop::collection::vec(tag_strategy(), 0..20)) {
            let once = TagNormalizer::normalize_tags(&tags);
            let twice = TagNormalizer::normalize_tags(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn output_follows_first_seen_order(tags in prop::collection::vec(tag_strategy(), 0..20)) {
            let out = TagNormalizer::normalize_tags(&tags);
            let first_index = |tag: &String| {
                tags.iter()
                    .position(|raw| &TagNormalizer::normalize_tag(raw) == tag)
                    .unwrap()
            };
            let positions: Vec<usize> = out.iter().map(first_index).collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn output_is_no_larger_than_input(tags in prop::collection::vec(tag_strategy(), 0..20)) {
            prop_assert!(TagNormalizer::normalize_tags(&tags).len() <= tags.len());
        }
    }
}
