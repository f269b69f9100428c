//! Configuration management for the sales assistant
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (`SALES_ASSIST__` prefix, `__` separator)
//!
//! Promotions are part of the settings: their declaration order is their
//! priority when more than one matches a request.

pub mod assistant;
pub mod constants;
pub mod promotions;
pub mod settings;

pub use assistant::{AssistantConfig, LlmConfig};
pub use promotions::Promotion;
pub use settings::{
    load_settings, ObservabilityConfig, RuntimeEnvironment, ServerConfig, Settings,
    StorageConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
