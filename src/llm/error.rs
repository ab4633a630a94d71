use thiserror::Error;

/// Errors that can occur when calling an LLM backend.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// The backend rejected the credential
    #[error("Unauthorized: status {status}")]
    Unauthorized { status: u16 },

    /// Any other non-success HTTP status
    #[error("HTTP error: status {status}")]
    Http { status: u16, body: String },

    /// Response body was not the JSON we expected
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Well-formed response that carries no usable completion
    #[error("API error: {message}")]
    Api { message: String },

    /// Invalid base URL configuration
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl LlmError {
    /// Classifies a transport error as a timeout or a generic network failure.
    pub(crate) fn transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }

    /// Maps a non-success status to the matching variant.
    pub(crate) fn status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Unauthorized {
                status: status.as_u16(),
            },
            code => Self::Http { status: code, body },
        }
    }

    /// Whether the failure is caused by a missing or rejected credential.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
