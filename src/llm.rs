//! HTTP clients for the LLM backends used to suggest tags.
//!
//! Each backend sits behind a small async trait so the suggester can be
//! exercised with hand-written mocks.
mod error;
mod gemini;
mod http;
mod openrouter;

pub use error::LlmError;
pub use gemini::{
    DEFAULT_GEMINI_BASE_URL, GEMINI_BASE_URL_ENV, GeminiClient, GeminiClientBuilder,
    StructuredGenerator,
};
pub use openrouter::{
    ChatCompleter, DEFAULT_OPENROUTER_BASE_URL, OPENROUTER_BASE_URL_ENV, OpenRouterClient,
    OpenRouterClientBuilder,
};
