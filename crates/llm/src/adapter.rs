//! Reply generator adapter
//!
//! Bridges the `LlmBackend` trait to the core `ReplyGenerator` trait so the
//! assistant can use any backend for premium replies.

use async_trait::async_trait;
use std::sync::Arc;

use sales_assist_core::{ReplyGenerator, ReplyPrompt, Result};

use crate::backend::{FinishReason, LlmBackend};
use crate::prompt::messages_for;
use crate::LlmError;

/// Adapter that wraps an `LlmBackend` to implement `ReplyGenerator`
///
/// # Example
///
/// ```ignore
/// let backend = OpenAIBackend::new(BackendConfig::from(&settings.llm))?;
/// let generator: Arc<dyn ReplyGenerator> = Arc::new(GeneratorAdapter::new(backend));
/// ```
pub struct GeneratorAdapter {
    backend: Arc<dyn LlmBackend>,
    model_name: String,
}

impl GeneratorAdapter {
    /// Create a new adapter wrapping a backend
    pub fn new<B: LlmBackend + 'static>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Create from an Arc'd backend
    pub fn from_arc(backend: Arc<dyn LlmBackend>) -> Self {
        let model_name = backend.model_name().to_string();
        Self {
            backend,
            model_name,
        }
    }
}

/// Trim whitespace and one layer of wrapping quotes
fn clean_reply(text: &str) -> String {
    let trimmed = text.trim();
    let unquoted = ['"', '“', '«', '\'']
        .iter()
        .zip(['"', '”', '»', '\''])
        .find_map(|(open, close)| {
            trimmed
                .strip_prefix(*open)
                .and_then(|rest| rest.strip_suffix(close))
        })
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}

#[async_trait]
impl ReplyGenerator for GeneratorAdapter {
    async fn generate(&self, prompt: &ReplyPrompt) -> Result<String> {
        let messages = messages_for(prompt);
        let result = self.backend.generate(&messages).await?;

        if result.finish_reason == FinishReason::Length {
            tracing::debug!(model = %self.model_name, "Reply truncated at max_tokens");
        }

        let text = clean_reply(&result.text);
        if text.is_empty() {
            return Err(LlmError::EmptyReply.into());
        }
        Ok(text)
    }

    async fn is_available(&self) -> bool {
        self.backend.is_available().await
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GenerationResult;
    use crate::prompt::{Message, Role};
    use std::sync::Mutex;

    struct FixedBackend {
        reply: &'static str,
        seen: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl LlmBackend for FixedBackend {
        async fn generate(
            &self,
            messages: &[Message],
        ) -> std::result::Result<GenerationResult, LlmError> {
            *self.seen.lock().unwrap() = messages.to_vec();
            Ok(GenerationResult {
                text: self.reply.to_string(),
                tokens: 4,
                total_time_ms: 1,
                finish_reason: FinishReason::Stop,
            })
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct DownBackend;

    #[async_trait]
    impl LlmBackend for DownBackend {
        async fn generate(
            &self,
            _messages: &[Message],
        ) -> std::result::Result<GenerationResult, LlmError> {
            Err(LlmError::Timeout)
        }

        async fn is_available(&self) -> bool {
            false
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    #[tokio::test]
    async fn test_generate_passes_prompt_and_cleans_reply() {
        let backend = Arc::new(FixedBackend {
            reply: "  \"Hola Ana, ¿te cuento la ruta?\"  ",
            seen: Mutex::default(),
        });
        let adapter = GeneratorAdapter::from_arc(backend.clone());

        let text = adapter
            .generate(&ReplyPrompt::new("sistema", "cliente"))
            .await
            .unwrap();

        assert_eq!(text, "Hola Ana, ¿te cuento la ruta?");
        assert_eq!(adapter.name(), "fixed");
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let adapter = GeneratorAdapter::new(FixedBackend {
            reply: " \"\" ",
            seen: Mutex::default(),
        });
        let err = adapter.generate(&ReplyPrompt::new("s", "u")).await.unwrap_err();
        assert_eq!(err.kind(), "generation");
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_generation_error() {
        let adapter = GeneratorAdapter::new(DownBackend);
        let err = adapter.generate(&ReplyPrompt::new("s", "u")).await.unwrap_err();
        assert_eq!(err.kind(), "generation");
        assert!(!adapter.is_available().await);
    }

    #[test]
    fn test_clean_reply() {
        assert_eq!(clean_reply("«Hola»"), "Hola");
        assert_eq!(clean_reply("“Hola”"), "Hola");
        assert_eq!(clean_reply("Hola \"Ana\""), "Hola \"Ana\"");
    }
}
