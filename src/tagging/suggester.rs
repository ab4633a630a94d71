//! Tag suggestion across the configured LLM backends.
//!
//! Gemini is tried model by model in priority order until one returns a
//! non-empty tag list. OpenRouter is a single attempt with the configured
//! model. Callers only ever see a [`TagSuggestion`]; backend failures are
//! logged and folded into control flow.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::llm::{
    ChatCompleter, GeminiClientBuilder, LlmError, OpenRouterClientBuilder, StructuredGenerator,
};
use crate::models::{Backend, SuggestionSource, TagSuggestion};

use super::extractor::{BraceSpanExtractor, ExtractError, ResponseExtractor};
use super::prompt::{JSON_ONLY_SYSTEM_PROMPT, build_prompt, tags_response_schema};

/// Gemini models in the order they are tried: most capable first.
pub const DEFAULT_GEMINI_MODELS: [&str; 3] =
    ["gemini-2.5-flash", "gemini-1.5-flash", "gemini-1.5-flash-8b"];

/// Why a suggestion request produced no tags.
///
/// The `Display` text is shown to the user as-is.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("{} API key missing", .0.label())]
    CredentialMissing(Backend),

    #[error("{} error: {source}", .backend.label())]
    Transport {
        backend: Backend,
        #[source]
        source: LlmError,
    },

    #[error("{} error: {source}", .backend.label())]
    MalformedResponse {
        backend: Backend,
        #[source]
        source: ExtractError,
    },

    #[error("{}", no_tags_message(.0))]
    NoTagsProduced(Backend),
}

fn no_tags_message(backend: &Backend) -> &'static str {
    match backend {
        Backend::Gemini => "Failed to generate tags from Gemini.",
        Backend::OpenRouter => {
            "OpenRouter returned no tags. Try another model or revise note content."
        }
    }
}

/// Picks the backend for one request.
///
/// An explicit `openrouter` setting wins. Otherwise OpenRouter is used only
/// when it is the sole backend with a credential, so a missing Gemini key
/// does not block users who configured OpenRouter alone.
pub fn select_backend(settings: &Settings) -> Backend {
    match settings.provider() {
        Some(Backend::OpenRouter) => Backend::OpenRouter,
        _ if settings.gemini_api_key().is_none() && settings.openrouter_api_key().is_some() => {
            info!("no Gemini key configured, falling back to OpenRouter");
            Backend::OpenRouter
        }
        _ => Backend::Gemini,
    }
}

/// Suggests tags for document text.
///
/// # Examples
///
/// ```no_run
/// use tagwise::config::Settings;
/// use tagwise::tagging::TagSuggester;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let suggester = TagSuggester::from_env()?;
/// let settings = Settings::from_env();
///
/// let result = suggester
///     .suggest("Meeting notes about Q3 budget planning", &settings)
///     .await;
/// println!("{}", serde_json::to_string(&result)?);
/// # Ok(())
/// # }
/// ```
pub struct TagSuggester {
    gemini: Arc<dyn StructuredGenerator>,
    openrouter: Arc<dyn ChatCompleter>,
    extractor: Arc<dyn ResponseExtractor>,
    gemini_models: Vec<String>,
}

impl TagSuggester {
    /// Creates a suggester over the given backends with the default Gemini
    /// model list and brace-span extraction.
    pub fn new(gemini: Arc<dyn StructuredGenerator>, openrouter: Arc<dyn ChatCompleter>) -> Self {
        Self {
            gemini,
            openrouter,
            extractor: Arc::new(BraceSpanExtractor),
            gemini_models: DEFAULT_GEMINI_MODELS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Creates a suggester with HTTP clients configured from the environment.
    pub fn from_env() -> Result<Self, LlmError> {
        let gemini = GeminiClientBuilder::new().build()?;
        let openrouter = OpenRouterClientBuilder::new().build()?;
        Ok(Self::new(Arc::new(gemini), Arc::new(openrouter)))
    }

    /// Replaces the Gemini model priority list.
    #[must_use]
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gemini_models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the completion parser.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn ResponseExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Suggests tags, folding every failure into [`TagSuggestion::Error`].
    ///
    /// Tags are returned exactly as the model produced them; normalization
    /// happens only when they are applied.
    pub async fn suggest(&self, text: &str, settings: &Settings) -> TagSuggestion {
        match self.try_suggest(text, settings).await {
            Ok((tags, source)) => {
                info!(
                    provider = %source.provider,
                    model = %source.model,
                    count = tags.len(),
                    "suggested tags"
                );
                TagSuggestion::Tags { tags, source }
            }
            Err(e) => {
                warn!(error = %e, "tag suggestion failed");
                TagSuggestion::error(e)
            }
        }
    }

    /// Suggests tags, returning the typed failure.
    ///
    /// # Errors
    ///
    /// Returns `SuggestError` when the selected backend has no credential or
    /// no attempt produced a non-empty tag list.
    pub async fn try_suggest(
        &self,
        text: &str,
        settings: &Settings,
    ) -> Result<(Vec<String>, SuggestionSource), SuggestError> {
        let prompt = build_prompt(text);

        match select_backend(settings) {
            Backend::OpenRouter => self.suggest_with_openrouter(&prompt, settings).await,
            Backend::Gemini => self.suggest_with_gemini(&prompt, settings).await,
        }
    }

    async fn suggest_with_openrouter(
        &self,
        prompt: &str,
        settings: &Settings,
    ) -> Result<(Vec<String>, SuggestionSource), SuggestError> {
        let api_key = settings
            .openrouter_api_key()
            .ok_or(SuggestError::CredentialMissing(Backend::OpenRouter))?;
        let model = settings.openrouter_model();
        info!(model, "calling OpenRouter");

        let content = self
            .openrouter
            .complete(api_key, model, JSON_ONLY_SYSTEM_PROMPT, prompt)
            .await
            .map_err(|source| {
                error!(model, error = %source, "OpenRouter request failed");
                SuggestError::Transport {
                    backend: Backend::OpenRouter,
                    source,
                }
            })?;

        if content.trim().is_empty() {
            return Err(SuggestError::NoTagsProduced(Backend::OpenRouter));
        }

        let tags = self
            .extractor
            .extract(&content)
            .map_err(|source| SuggestError::MalformedResponse {
                backend: Backend::OpenRouter,
                source,
            })?;

        if tags.is_empty() {
            return Err(SuggestError::NoTagsProduced(Backend::OpenRouter));
        }
        Ok((tags, SuggestionSource::new(Backend::OpenRouter, model)))
    }

    async fn suggest_with_gemini(
        &self,
        prompt: &str,
        settings: &Settings,
    ) -> Result<(Vec<String>, SuggestionSource), SuggestError> {
        let api_key = settings
            .gemini_api_key()
            .ok_or(SuggestError::CredentialMissing(Backend::Gemini))?;
        let schema = tags_response_schema();

        // Strictly sequential: stop at the first model that yields tags.
        for model in &self.gemini_models {
            info!(model = %model, "calling Gemini model");

            let text = match self.gemini.generate(api_key, model, prompt, &schema).await {
                Ok(text) => text,
                Err(e) if e.is_auth() => {
                    warn!(model = %model, error = %e, "Gemini rejected the API key");
                    continue;
                }
                Err(e) => {
                    error!(model = %model, error = %e, "Gemini model failed");
                    continue;
                }
            };

            match self.extractor.extract(&text) {
                Ok(tags) if !tags.is_empty() => {
                    return Ok((tags, SuggestionSource::new(Backend::Gemini, model.as_str())));
                }
                Ok(_) => warn!(model = %model, "Gemini model returned no tags"),
                Err(e) => warn!(model = %model, error = %e, "Gemini model returned malformed JSON"),
            }
        }

        Err(SuggestError::NoTagsProduced(Backend::Gemini))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and records which models were called.
    struct ScriptedGemini {
        responses: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedGemini {
        fn new(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StructuredGenerator for ScriptedGemini {
        async fn generate(
            &self,
            _api_key: &str,
            model: &str,
            _prompt: &str,
            schema: &Value,
        ) -> Result<String, LlmError> {
            assert_eq!(schema["required"][0], "tags");
            self.calls.lock().unwrap().push(model.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    struct MockOpenRouter {
        response: Mutex<Option<Result<String, LlmError>>>,
        captured: Mutex<Option<(String, String, String)>>,
    }

    impl MockOpenRouter {
        fn new(response: Result<String, LlmError>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                captured: Mutex::new(None),
            })
        }

        fn unused() -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(None),
                captured: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ChatCompleter for MockOpenRouter {
        async fn complete(
            &self,
            api_key: &str,
            model: &str,
            system: &str,
            _user: &str,
        ) -> Result<String, LlmError> {
            *self.captured.lock().unwrap() =
                Some((api_key.to_string(), model.to_string(), system.to_string()));
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("OpenRouter called unexpectedly")
        }
    }

    fn http_error(status: u16) -> LlmError {
        LlmError::Http {
            status,
            body: String::new(),
        }
    }

    fn gemini_settings() -> Settings {
        Settings::builder()
            .provider("gemini")
            .gemini_api_key("g-key")
            .build()
    }

    fn openrouter_settings() -> Settings {
        Settings::builder()
            .provider("openrouter")
            .openrouter_api_key("or-key")
            .openrouter_model("meta-llama/llama-3.1-8b-instruct")
            .build()
    }

    #[tokio::test]
    async fn third_model_succeeds_after_two_failures() {
        let gemini = ScriptedGemini::new(vec![
            Err(http_error(503)),
            Ok("no json here".to_string()),
            Ok(r#"{"tags":["x","y","z","w","v"]}"#.to_string()),
        ]);
        let suggester = TagSuggester::new(gemini.clone(), MockOpenRouter::unused())
            .with_models(["m1", "m2", "m3"]);

        let result = suggester.suggest("text", &gemini_settings()).await;

        assert_eq!(
            result,
            TagSuggestion::Tags {
                tags: vec!["x", "y", "z", "w", "v"].into_iter().map(String::from).collect(),
                source: SuggestionSource::new(Backend::Gemini, "m3"),
            }
        );
        assert_eq!(gemini.calls(), vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn first_success_short_circuits_remaining_models() {
        let gemini = ScriptedGemini::new(vec![Ok(r#"{"tags":["a"]}"#.to_string())]);
        let suggester = TagSuggester::new(gemini.clone(), MockOpenRouter::unused())
            .with_models(["m1", "m2", "m3"]);

        let result = suggester.suggest("text", &gemini_settings()).await;

        assert_eq!(result.tags(), Some(&["a".to_string()][..]));
        assert_eq!(gemini.calls(), vec!["m1"]);
    }

    #[tokio::test]
    async fn all_models_failing_returns_generic_error_after_three_calls() {
        let gemini = ScriptedGemini::new(vec![
            Err(http_error(500)),
            Err(LlmError::Unauthorized { status: 401 }),
            Ok(r#"{"tags":[]}"#.to_string()),
        ]);
        let suggester = TagSuggester::new(gemini.clone(), MockOpenRouter::unused())
            .with_models(["m1", "m2", "m3"]);

        let result = suggester.suggest("text", &gemini_settings()).await;

        assert_eq!(
            result.error_message(),
            Some("Failed to generate tags from Gemini.")
        );
        assert_eq!(gemini.calls(), vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn default_model_list_is_tried_in_priority_order() {
        let gemini = ScriptedGemini::new(vec![]);
        let suggester = TagSuggester::new(gemini.clone(), MockOpenRouter::unused());

        let _ = suggester.suggest("text", &gemini_settings()).await;

        assert_eq!(gemini.calls(), DEFAULT_GEMINI_MODELS.to_vec());
    }

    #[tokio::test]
    async fn missing_gemini_key_is_reported_without_calls() {
        let gemini = ScriptedGemini::new(vec![]);
        let suggester = TagSuggester::new(gemini.clone(), MockOpenRouter::unused());
        let settings = Settings::builder()
            .provider("gemini")
            .gemini_api_key("")
            .build();

        let result = suggester.suggest("text", &settings).await;
        assert_eq!(result.error_message(), Some("Gemini API key missing"));
        assert!(gemini.calls().is_empty());
    }

    #[tokio::test]
    async fn openrouter_returns_tags_from_prose_wrapped_json() {
        let openrouter =
            MockOpenRouter::new(Ok(r#"Sure: {"tags":["budget","q3"]} enjoy"#.to_string()));
        let gemini = ScriptedGemini::new(vec![]);
        let suggester = TagSuggester::new(gemini.clone(), openrouter.clone());

        let result = suggester.suggest("text", &openrouter_settings()).await;

        assert_eq!(
            result,
            TagSuggestion::Tags {
                tags: vec!["budget".to_string(), "q3".to_string()],
                source: SuggestionSource::new(
                    Backend::OpenRouter,
                    "meta-llama/llama-3.1-8b-instruct"
                ),
            }
        );
        assert!(gemini.calls().is_empty());

        let captured = openrouter.captured.lock().unwrap().clone().unwrap();
        assert_eq!(captured.0, "or-key");
        assert_eq!(captured.2, JSON_ONLY_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn openrouter_transport_failure_is_terminal() {
        let openrouter = MockOpenRouter::new(Err(http_error(502)));
        let gemini = ScriptedGemini::new(vec![]);
        let suggester = TagSuggester::new(gemini.clone(), openrouter);

        let result = suggester.suggest("text", &openrouter_settings()).await;

        assert_eq!(
            result.error_message(),
            Some("OpenRouter error: HTTP error: status 502")
        );
        assert!(gemini.calls().is_empty());
    }

    #[tokio::test]
    async fn openrouter_malformed_response_is_terminal() {
        let openrouter = MockOpenRouter::new(Ok("I cannot help with that".to_string()));
        let suggester = TagSuggester::new(ScriptedGemini::new(vec![]), openrouter);

        let result = suggester.suggest("text", &openrouter_settings()).await;

        let message = result.error_message().unwrap();
        assert!(message.starts_with("OpenRouter error: Malformed response"));
    }

    #[tokio::test]
    async fn openrouter_empty_tags_is_an_error() {
        let openrouter = MockOpenRouter::new(Ok(r#"{"tags":[]}"#.to_string()));
        let suggester = TagSuggester::new(ScriptedGemini::new(vec![]), openrouter);

        let result = suggester.suggest("text", &openrouter_settings()).await;

        assert_eq!(
            result.error_message(),
            Some("OpenRouter returned no tags. Try another model or revise note content.")
        );
    }

    #[tokio::test]
    async fn openrouter_blank_content_is_an_error() {
        let openrouter = MockOpenRouter::new(Ok("   ".to_string()));
        let suggester = TagSuggester::new(ScriptedGemini::new(vec![]), openrouter);

        let error = suggester
            .try_suggest("text", &openrouter_settings())
            .await
            .unwrap_err();

        assert!(matches!(error, SuggestError::NoTagsProduced(Backend::OpenRouter)));
    }

    /// Splits a plain comma list instead of parsing JSON.
    struct CommaListExtractor;

    impl ResponseExtractor for CommaListExtractor {
        fn extract(&self, completion: &str) -> Result<Vec<String>, ExtractError> {
            Ok(completion
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect())
        }
    }

    #[tokio::test]
    async fn custom_extractor_replaces_json_parsing() {
        let gemini = ScriptedGemini::new(vec![Ok("Budget, Q3 ,planning".to_string())]);
        let suggester = TagSuggester::new(gemini.clone(), MockOpenRouter::unused())
            .with_models(["m1", "m2"])
            .with_extractor(Arc::new(CommaListExtractor));

        let result = suggester.suggest("text", &gemini_settings()).await;

        assert_eq!(
            result,
            TagSuggestion::Tags {
                tags: vec!["Budget".to_string(), "Q3".to_string(), "planning".to_string()],
                source: SuggestionSource::new(Backend::Gemini, "m1"),
            }
        );
        assert_eq!(gemini.calls(), vec!["m1"]);
    }

    #[tokio::test]
    async fn missing_openrouter_key_is_reported_without_calls() {
        let gemini = ScriptedGemini::new(vec![]);
        let suggester = TagSuggester::new(gemini.clone(), MockOpenRouter::unused());
        let settings = Settings::builder()
            .provider("openrouter")
            .gemini_api_key("g-key")
            .build();

        let result = suggester.suggest("text", &settings).await;

        assert_eq!(result, TagSuggestion::error("OpenRouter API key missing"));
        assert!(gemini.calls().is_empty());
    }

    #[test]
    fn openrouter_selected_when_it_is_the_only_credential() {
        let settings = Settings::builder()
            .provider("gemini")
            .openrouter_api_key("or-key")
            .build();

        assert_eq!(select_backend(&settings), Backend::OpenRouter);
    }

    #[test]
    fn gemini_selected_when_both_credentials_present() {
        let settings = Settings::builder()
            .gemini_api_key("g")
            .openrouter_api_key("o")
            .provider("gemini")
            .build();

        assert_eq!(select_backend(&settings), Backend::Gemini);
    }

    #[test]
    fn explicit_openrouter_wins_even_with_gemini_key() {
        let settings = Settings::builder()
            .provider("openrouter")
            .gemini_api_key("g")
            .build();

        assert_eq!(select_backend(&settings), Backend::OpenRouter);
    }

    #[test]
    fn unknown_provider_defaults_to_gemini() {
        let settings = Settings::builder()
            .provider("huggingface")
            .gemini_api_key("g")
            .build();

        assert_eq!(select_backend(&settings), Backend::Gemini);
    }

    #[test]
    fn credential_missing_messages_name_the_backend() {
        assert_eq!(
            SuggestError::CredentialMissing(Backend::OpenRouter).to_string(),
            "OpenRouter API key missing"
        );
        assert_eq!(
            SuggestError::CredentialMissing(Backend::Gemini).to_string(),
            "Gemini API key missing"
        );
    }
}
