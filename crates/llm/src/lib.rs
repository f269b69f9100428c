//! Generative reply provider
//!
//! Features:
//! - OpenAI-compatible chat completions backend (OpenAI, Azure-style
//!   gateways, vLLM, local servers)
//! - Retry with exponential backoff for transient failures
//! - Adapter exposing a backend as the core `ReplyGenerator`

pub mod adapter;
pub mod backend;
pub mod factory;
pub mod prompt;

pub use adapter::GeneratorAdapter;
pub use backend::{BackendConfig, FinishReason, GenerationResult, LlmBackend, OpenAIBackend};
pub use factory::create_generator;
pub use prompt::{Message, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty reply")]
    EmptyReply,

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for sales_assist_core::Error {
    fn from(err: LlmError) -> Self {
        sales_assist_core::Error::Generation(err.to_string())
    }
}
