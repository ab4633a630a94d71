//! Client for OpenRouter's OpenAI-compatible chat completions API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::LlmError;
use super::http::{build_client, resolve_base_url, send_json};

/// Public OpenRouter endpoint.
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai";
/// Environment variable overriding the OpenRouter base URL.
pub const OPENROUTER_BASE_URL_ENV: &str = "OPENROUTER_BASE_URL";

/// Sent as `X-Title` so OpenRouter can attribute requests.
const CLIENT_TITLE: &str = "tagwise tag suggester";
/// Low temperature keeps the JSON shape stable.
const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 200;

/// A chat-style completion backend.
///
/// Sends a system instruction followed by a user prompt and returns the
/// assistant's message text.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, LlmError>;
}

/// Builder for constructing `OpenRouterClient` instances.
#[derive(Debug, Default)]
pub struct OpenRouterClientBuilder {
    base_url: Option<String>,
}

impl OpenRouterClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL, taking precedence over `OPENROUTER_BASE_URL`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn build(self) -> Result<OpenRouterClient, LlmError> {
        let base_url = resolve_base_url(
            self.base_url,
            OPENROUTER_BASE_URL_ENV,
            DEFAULT_OPENROUTER_BASE_URL,
        )?;

        Ok(OpenRouterClient {
            client: build_client()?,
            base_url,
        })
    }
}

/// Async HTTP client for OpenRouter chat completions.
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenRouterClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, or an empty string when absent.
    fn first_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatCompleter for OpenRouterClient {
    async fn complete(
        &self,
        api_key: &str,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let request = self
            .client
            .post(format!("{}/api/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .header("X-Title", CLIENT_TITLE)
            .json(&body);

        let response: ChatResponse = send_json(request).await?;
        Ok(response.first_content())
    }
}
