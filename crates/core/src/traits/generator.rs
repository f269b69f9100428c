//! Generative reply provider
//!
//! The assistant never depends on a concrete language model. Any backend
//! that turns a system/user prompt pair into text can be plugged in here;
//! a failure is treated as "no reply available".

use async_trait::async_trait;

use crate::Result;

/// Prompt pair sent to a generative provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPrompt {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl ReplyPrompt {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }
}

/// Generative reply backend
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Produce reply text for the prompt
    async fn generate(&self, prompt: &ReplyPrompt) -> Result<String>;

    /// Check if the backend is reachable
    async fn is_available(&self) -> bool;

    /// Backend/model name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct Failing;

    #[async_trait]
    impl ReplyGenerator for Failing {
        async fn generate(&self, _prompt: &ReplyPrompt) -> Result<String> {
            Err(Error::Generation("unreachable".into()))
        }

        async fn is_available(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_trait_object_usable() {
        let generator: Box<dyn ReplyGenerator> = Box::new(Failing);
        let prompt = ReplyPrompt::new("system", "user");
        assert!(generator.generate(&prompt).await.is_err());
        assert!(!generator.is_available().await);
        assert_eq!(generator.name(), "failing");
    }
}
