//! Client for the Gemini `generateContent` API with structured output.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::LlmError;
use super::http::{build_client, resolve_base_url, send_json};

/// Public Gemini API endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Environment variable overriding the Gemini base URL.
pub const GEMINI_BASE_URL_ENV: &str = "GEMINI_BASE_URL";

/// A backend that generates text constrained to a JSON schema.
///
/// This trait enables mocking in unit tests. The API key is passed per call
/// because settings are read fresh for each request.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    /// Runs one non-streaming generation and returns the completion text.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Credential for this call
    /// * `model` - Model identifier (e.g., "gemini-2.5-flash")
    /// * `prompt` - Full prompt text
    /// * `schema` - Response schema the output must follow
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, LlmError>;
}

/// Builder for constructing `GeminiClient` instances.
///
/// # Examples
///
/// ```
/// use tagwise::llm::GeminiClientBuilder;
///
/// let client = GeminiClientBuilder::new()
///     .base_url("http://localhost:8080")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.base_url(), "http://localhost:8080");
/// ```
#[derive(Debug, Default)]
pub struct GeminiClientBuilder {
    base_url: Option<String>,
}

impl GeminiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL, taking precedence over `GEMINI_BASE_URL`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the client.
    ///
    /// Returns `LlmError::InvalidUrl` if the resolved base URL does not parse.
    pub fn build(self) -> Result<GeminiClient, LlmError> {
        let base_url =
            resolve_base_url(self.base_url, GEMINI_BASE_URL_ENV, DEFAULT_GEMINI_BASE_URL)?;

        Ok(GeminiClient {
            client: build_client()?,
            base_url,
        })
    }
}

/// Async HTTP client for Gemini structured generation.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

/// Request body for one structured generation call.
pub(crate) fn request_body(prompt: &str, schema: &Value) -> Value {
    json!({
        "contents": [
            { "role": "user", "parts": [{ "text": prompt }] }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema,
        }
    })
}

fn completion_text(response: GenerateResponse) -> Result<String, LlmError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let message = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|reason| format!("Prompt blocked: {reason}"))
            .unwrap_or_else(|| "Missing 'candidates' in API response".to_string());
        return Err(LlmError::Api { message });
    };

    Ok(candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

#[async_trait]
impl StructuredGenerator for GeminiClient {
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, LlmError> {
        let request = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&request_body(prompt, schema));

        let response: GenerateResponse = send_json(request).await?;
        completion_text(response)
    }
}
