//! Assistant and generative-provider configuration

use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, limits, templates};

/// Reply assembly settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Label substituted for the name placeholder when no name is given
    #[serde(default = "default_customer_name")]
    pub default_customer_name: String,

    /// Placeholder token inside variant templates
    #[serde(default = "default_name_placeholder")]
    pub name_placeholder: String,

    /// Maximum characters kept in a text signature
    #[serde(default = "default_signature_max_chars")]
    pub signature_max_chars: usize,

    /// Soft cap for replies carrying a promotion CTA
    #[serde(default = "default_promo_max_chars")]
    pub promo_max_chars: usize,

    /// Allow premium (generated) replies
    #[serde(default = "default_true")]
    pub premium_enabled: bool,
}

fn default_customer_name() -> String {
    templates::DEFAULT_CUSTOMER_NAME.to_string()
}
fn default_name_placeholder() -> String {
    templates::NAME_PLACEHOLDER.to_string()
}
fn default_signature_max_chars() -> usize {
    limits::SIGNATURE_MAX_CHARS
}
fn default_promo_max_chars() -> usize {
    limits::PROMO_MAX_CHARS
}
fn default_true() -> bool {
    true
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            default_customer_name: default_customer_name(),
            name_placeholder: default_name_placeholder(),
            signature_max_chars: default_signature_max_chars(),
            promo_max_chars: default_promo_max_chars(),
            premium_enabled: true,
        }
    }
}

/// Generative provider configuration (OpenAI-compatible chat API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Enable the generative provider
    #[serde(default)]
    pub enabled: bool,

    /// API base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key (set via SALES_ASSIST__LLM__API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_llm_endpoint() -> String {
    endpoints::LLM_DEFAULT.to_string()
}
fn default_llm_model() -> String {
    endpoints::LLM_MODEL_DEFAULT.to_string()
}
fn default_max_tokens() -> usize {
    220
}
fn default_temperature() -> f32 {
    0.6
}
fn default_timeout_ms() -> u64 {
    12_000
}
fn default_max_retries() -> u32 {
    2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.name_placeholder, "{name}");
        assert_eq!(config.signature_max_chars, 160);
        assert_eq!(config.promo_max_chars, 260);
    }

    #[test]
    fn test_llm_disabled_by_default() {
        let config: LlmConfig = serde_yaml::from_str("model: local-model").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.model, "local-model");
        assert_eq!(config.max_retries, 2);
    }
}
