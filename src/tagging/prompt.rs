use serde_json::{Value, json};

/// Number of tags every backend is asked for.
pub const REQUESTED_TAG_COUNT: usize = 5;

/// System message for chat backends that have no schema support.
pub const JSON_ONLY_SYSTEM_PROMPT: &str = "You output JSON only.";

const PROMPT_TEMPLATE: &str = r#"You are an expert at analyzing text and extracting key topics to be used as tags.
Analyze the following note content. Based on your analysis, generate exactly {count} relevant and concise tags.
Each tag should be 1-3 words long. Write the tags in the same language as the note.
Return your response as a JSON object with the shape { "tags": string[] } and nothing else.

Note Content:
---
{content}
---"#;

/// Builds the generation prompt for a document.
///
/// # Examples
///
/// ```
/// use tagwise::tagging::build_prompt;
///
/// let prompt = build_prompt("Meeting notes about Q3 budget planning");
/// assert!(prompt.contains("exactly 5"));
/// assert!(prompt.contains("---\nMeeting notes about Q3 budget planning\n---"));
/// ```
pub fn build_prompt(content: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{count}", &REQUESTED_TAG_COUNT.to_string())
        .replace("{content}", content)
}

/// Output schema for structured generation: an object whose required
/// `tags` field is an array of strings.
pub fn tags_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "tags": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["tags"]
    })
}
