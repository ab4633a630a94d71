//! Runtime settings for tag suggestion.
//!
//! Settings are read fresh for every request. [`Settings::from_env`] reads
//! the process environment; [`SettingsBuilder`] never does, so a key the
//! host has cleared stays cleared. Blank values are treated as absent.

use async_trait::async_trait;
use tracing::warn;

use crate::models::Backend;

/// Environment variable selecting the provider (`gemini` or `openrouter`).
pub const PROVIDER_ENV: &str = "TAGWISE_PROVIDER";
/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable holding the OpenRouter API key.
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";
/// Environment variable overriding the OpenRouter model.
pub const OPENROUTER_MODEL_ENV: &str = "OPENROUTER_MODEL";

/// Model used with OpenRouter when none is configured.
pub const DEFAULT_OPENROUTER_MODEL: &str = "openrouter/auto";

/// Provider selection and credentials for a single suggestion request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    provider: Option<String>,
    gemini_api_key: Option<String>,
    openrouter_api_key: Option<String>,
    openrouter_model: Option<String>,
}

impl Settings {
    /// Creates a builder with nothing set.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Reads all settings from the environment ([`PROVIDER_ENV`],
    /// [`GEMINI_API_KEY_ENV`], [`OPENROUTER_API_KEY_ENV`],
    /// [`OPENROUTER_MODEL_ENV`]).
    pub fn from_env() -> Self {
        Self {
            provider: env_value(PROVIDER_ENV),
            gemini_api_key: env_value(GEMINI_API_KEY_ENV),
            openrouter_api_key: env_value(OPENROUTER_API_KEY_ENV),
            openrouter_model: env_value(OPENROUTER_MODEL_ENV),
        }
    }

    /// The configured provider, if it names a known backend.
    ///
    /// Legacy or misspelled values are reported and treated as unset.
    pub fn provider(&self) -> Option<Backend> {
        let raw = self.provider.as_deref()?;
        let parsed = Backend::parse(raw);
        if parsed.is_none() {
            warn!(provider = raw, "unrecognized provider setting, using default");
        }
        parsed
    }

    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key.as_deref()
    }

    pub fn openrouter_api_key(&self) -> Option<&str> {
        self.openrouter_api_key.as_deref()
    }

    /// The OpenRouter model, falling back to [`DEFAULT_OPENROUTER_MODEL`].
    pub fn openrouter_model(&self) -> &str {
        self.openrouter_model
            .as_deref()
            .unwrap_or(DEFAULT_OPENROUTER_MODEL)
    }
}

/// Builder for [`Settings`].
///
/// # Examples
///
/// ```
/// use tagwise::config::Settings;
/// use tagwise::Backend;
///
/// let settings = Settings::builder()
///     .provider("openrouter")
///     .openrouter_api_key("sk-test")
///     .build();
///
/// assert_eq!(settings.provider(), Some(Backend::OpenRouter));
/// assert_eq!(settings.openrouter_model(), "openrouter/auto");
/// ```
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    provider: Option<String>,
    gemini_api_key: Option<String>,
    openrouter_api_key: Option<String>,
    openrouter_model: Option<String>,
}

impl SettingsBuilder {
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(key.into());
        self
    }

    pub fn openrouter_api_key(mut self, key: impl Into<String>) -> Self {
        self.openrouter_api_key = Some(key.into());
        self
    }

    pub fn openrouter_model(mut self, model: impl Into<String>) -> Self {
        self.openrouter_model = Some(model.into());
        self
    }

    /// Builds the settings from the builder values alone.
    ///
    /// Fields left unset, or set to a blank string, are absent. The
    /// environment is not consulted.
    pub fn build(self) -> Settings {
        Settings {
            provider: non_blank(self.provider),
            gemini_api_key: non_blank(self.gemini_api_key),
            openrouter_api_key: non_blank(self.openrouter_api_key),
            openrouter_model: non_blank(self.openrouter_model),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Supplies settings for each request.
///
/// Implementations must not assume the values stay the same between calls.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn load(&self) -> anyhow::Result<Settings>;
}

/// Reads settings from the process environment on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSettings;

#[async_trait]
impl SettingsSource for EnvSettings {
    async fn load(&self) -> anyhow::Result<Settings> {
        Ok(Settings::from_env())
    }
}

/// Returns the same settings every time.
#[derive(Debug, Clone)]
pub struct FixedSettings(pub Settings);

#[async_trait]
impl SettingsSource for FixedSettings {
    async fn load(&self) -> anyhow::Result<Settings> {
        Ok(self.0.clone())
    }
}
