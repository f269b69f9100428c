//! LLM backend implementations
//!
//! A single OpenAI-compatible chat completions backend. Anything that speaks
//! `POST {endpoint}/chat/completions` works: OpenAI, vLLM, Ollama's OpenAI
//! mode, or a gateway in front of another provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use sales_assist_config::LlmConfig;

use crate::prompt::Message;
use crate::LlmError;

/// Backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// API endpoint (OpenAI: https://api.openai.com/v1)
    pub endpoint: String,
    /// API key, optional for local servers
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature (0-2)
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for BackendConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(200),
        }
    }
}

impl BackendConfig {
    fn is_local(&self) -> bool {
        let endpoint = self.endpoint.trim_start_matches("http://");
        endpoint.starts_with("localhost") || endpoint.starts_with("127.0.0.1")
    }
}

/// LLM generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Tokens generated, 0 when the server does not report usage
    pub tokens: usize,
    /// Total generation time (ms), retries included
    pub total_time_ms: u64,
    /// Finish reason
    pub finish_reason: FinishReason,
}

/// Finish reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
}

/// LLM Backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError>;

    /// Check if model is available
    async fn is_available(&self) -> bool;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible backend
pub struct OpenAIBackend {
    config: BackendConfig,
    client: Client,
}

impl OpenAIBackend {
    /// Create new OpenAI backend
    pub fn new(config: BackendConfig) -> Result<Self, LlmError> {
        if config.api_key.is_none() && !config.is_local() {
            return Err(LlmError::Configuration(
                "API key required for remote endpoints".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Full API URL for chat completions
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    /// Build request headers
    fn build_headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::HeaderValue;

        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(ref api_key) = self.config.api_key {
            let auth_value = format!("Bearer {}", api_key);
            if let Ok(val) = HeaderValue::from_str(&auth_value) {
                headers.insert(reqwest::header::AUTHORIZATION, val);
            }
        }

        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        headers
    }

    fn build_request(&self, messages: &[Message]) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: self.config.model.clone(),
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            stream: Some(false),
        }
    }

    /// Execute a single request (used by retry logic)
    async fn execute_request(
        &self,
        request: &OpenAIChatRequest,
    ) -> Result<OpenAIChatResponse, LlmError> {
        let response = self
            .client
            .post(self.chat_url())
            .headers(self.build_headers())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            // 429 and 5xx are retryable, other 4xx are not
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::RateLimited(error));
            }
            if status.is_server_error() {
                return Err(LlmError::Network(format!("Server error {}: {}", status, error)));
            }
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error)));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Check if an error is retryable
    pub(crate) fn is_retryable(error: &LlmError) -> bool {
        matches!(
            error,
            LlmError::Network(_) | LlmError::RateLimited(_) | LlmError::Timeout
        )
    }
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    /// Generate a response, retrying transient failures with exponential backoff
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let start = std::time::Instant::now();
        let request = self.build_request(messages);
        let mut backoff = self.config.initial_backoff;
        let mut attempt = 0;

        let response = loop {
            match self.execute_request(&request).await {
                Ok(response) => break response,
                Err(e) if Self::is_retryable(&e) && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "LLM request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e),
            }
        };

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        let total_time_ms = start.elapsed().as_millis() as u64;
        let tokens = response.usage.as_ref().map(|u| u.completion_tokens).unwrap_or(0);

        tracing::debug!(
            model = %self.config.model,
            tokens,
            total_time_ms,
            "LLM generation complete"
        );

        Ok(GenerationResult {
            text: choice.message.content.clone(),
            tokens,
            total_time_ms,
            finish_reason: match choice.finish_reason.as_deref() {
                Some("length") => FinishReason::Length,
                _ => FinishReason::Stop,
            },
        })
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.config.endpoint.trim_end_matches('/'));
        self.client
            .get(&url)
            .headers(self.build_headers())
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    completion_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> BackendConfig {
        BackendConfig {
            endpoint: "http://localhost:8000/v1/".to_string(),
            api_key: None,
            ..BackendConfig::default()
        }
    }

    #[test]
    fn test_config_from_settings() {
        let settings = LlmConfig {
            api_key: Some("  ".to_string()),
            timeout_ms: 1500,
            ..LlmConfig::default()
        };
        let config = BackendConfig::from(&settings);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.model, settings.model);
    }

    #[test]
    fn test_remote_endpoint_requires_key() {
        let config = BackendConfig {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            ..BackendConfig::default()
        };
        assert!(matches!(
            OpenAIBackend::new(config),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_local_endpoint_without_key() {
        let backend = OpenAIBackend::new(local_config()).unwrap();
        assert_eq!(backend.chat_url(), "http://localhost:8000/v1/chat/completions");
        assert!(backend
            .build_headers()
            .get(reqwest::header::AUTHORIZATION)
            .is_none());
    }

    #[test]
    fn test_bearer_header() {
        let config = BackendConfig {
            api_key: Some("sk-test".to_string()),
            ..local_config()
        };
        let backend = OpenAIBackend::new(config).unwrap();
        let headers = backend.build_headers();
        assert_eq!(headers.get(reqwest::header::AUTHORIZATION).unwrap(), "Bearer sk-test");
    }

    #[test]
    fn test_request_serialization() {
        let backend = OpenAIBackend::new(local_config()).unwrap();
        let request = backend.build_request(&[Message::system("sys"), Message::user("hola")]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hola");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hola Ana"}, "finish_reason": "stop"}],
            "usage": {"completion_tokens": 3, "prompt_tokens": 10, "total_tokens": 13}
        }"#;
        let response: OpenAIChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.choices[0].message.content, "Hola Ana");
        assert_eq!(response.usage.unwrap().completion_tokens, 3);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(OpenAIBackend::is_retryable(&LlmError::Timeout));
        assert!(OpenAIBackend::is_retryable(&LlmError::Network("reset".into())));
        assert!(OpenAIBackend::is_retryable(&LlmError::RateLimited("slow down".into())));
        assert!(!OpenAIBackend::is_retryable(&LlmError::Api("HTTP 401".into())));
        assert!(!OpenAIBackend::is_retryable(&LlmError::EmptyReply));
    }
}
