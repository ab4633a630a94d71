use std::time::Duration;

use serde::de::DeserializeOwned;

use super::LlmError;

/// Upper bound for a whole request, including reading the body.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the shared reqwest client with timeouts applied.
pub(crate) fn build_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(LlmError::Network)
}

/// Resolves the base URL from the builder value, an environment variable,
/// or a default, and validates it.
pub(crate) fn resolve_base_url(
    explicit: Option<String>,
    env_var: &str,
    default: &str,
) -> Result<String, LlmError> {
    let base_url = explicit
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| default.to_string());

    reqwest::Url::parse(&base_url)
        .map_err(|e| LlmError::InvalidUrl(format!("{}: {}", base_url, e)))?;

    Ok(base_url.trim_end_matches('/').to_string())
}

/// Sends a prepared request and decodes a JSON body from a 2xx response.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, LlmError> {
    let response = request.send().await.map_err(LlmError::transport)?;

    let status = response.status();
    let body = response.text().await.map_err(LlmError::transport)?;
    if !status.is_success() {
        return Err(LlmError::status(status, body));
    }

    serde_json::from_str(&body).map_err(LlmError::Serialization)
}
