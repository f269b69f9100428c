//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{limits, snapshots};
use crate::{AssistantConfig, ConfigError, LlmConfig, Promotion};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Snapshot storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Reply assembly
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Generative provider
    #[serde(default)]
    pub llm: LlmConfig,

    /// Promotions in priority order
    #[serde(default)]
    pub promotions: Vec<Promotion>,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_assistant()?;
        self.validate_llm()?;
        self.validate_promotions()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_assistant(&self) -> Result<(), ConfigError> {
        let assistant = &self.assistant;

        if assistant.signature_max_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "assistant.signature_max_chars".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if assistant.promo_max_chars < limits::PROMO_MIN_CHARS {
            return Err(ConfigError::InvalidValue {
                field: "assistant.promo_max_chars".to_string(),
                message: format!(
                    "Must be at least {}, got {}",
                    limits::PROMO_MIN_CHARS,
                    assistant.promo_max_chars
                ),
            });
        }

        if assistant.name_placeholder.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "assistant.name_placeholder".to_string(),
                message: "Placeholder must not be empty".to_string(),
            });
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", self.llm.temperature),
            });
        }

        if self.llm.enabled && self.llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "Must be greater than 0 when the provider is enabled".to_string(),
            });
        }

        Ok(())
    }

    fn validate_promotions(&self) -> Result<(), ConfigError> {
        for promotion in &self.promotions {
            promotion.validate()?;
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON snapshots
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Snapshot name of the variant table
    #[serde(default = "default_variants_snapshot")]
    pub variants_snapshot: String,

    /// Snapshot name of the reply statistics
    #[serde(default = "default_stats_snapshot")]
    pub stats_snapshot: String,

    /// Reload the variant table when its file changes
    #[serde(default = "default_true")]
    pub watch_variants: bool,

    /// Debounce window for file change events (ms)
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_variants_snapshot() -> String {
    snapshots::VARIANTS.to_string()
}
fn default_stats_snapshot() -> String {
    snapshots::STATS.to_string()
}
fn default_watch_debounce_ms() -> u64 {
    250
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            variants_snapshot: default_variants_snapshot(),
            stats_snapshot: default_stats_snapshot(),
            watch_variants: true,
            watch_debounce_ms: default_watch_debounce_ms(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (SALES_ASSIST__ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("SALES_ASSIST")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        promotions = settings.promotions.len(),
        "Settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.storage.variants_snapshot, "variants");
        assert!(settings.storage.watch_variants);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate_server().is_err());

        settings.server.port = 8080;
        settings.server.timeout_seconds = 0;
        assert!(settings.validate_server().is_err());
    }

    #[test]
    fn test_assistant_validation() {
        let mut settings = Settings::default();
        settings.assistant.promo_max_chars = 10;
        assert!(settings.validate_assistant().is_err());

        settings.assistant.promo_max_chars = 260;
        settings.assistant.signature_max_chars = 0;
        assert!(settings.validate_assistant().is_err());
    }

    #[test]
    fn test_llm_temperature_bounds() {
        let mut settings = Settings::default();
        settings.llm.temperature = 2.5;
        assert!(settings.validate_llm().is_err());

        settings.llm.temperature = 0.0;
        assert!(settings.validate_llm().is_ok());
    }

    #[test]
    fn test_yaml_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(
            &path,
            r#"
server:
  port: 9000
storage:
  data_dir: /var/lib/sales-assist
  watch_variants: false
promotions:
  - id: launch
    starts_at: 2026-01-01T00:00:00Z
    ends_at: 2026-02-01T00:00:00Z
    stages: [pre_close, close]
    badge: "-15%"
    label: Lanzamiento
    short_cta: Pregunta por la beca de lanzamiento.
"#,
        )
        .unwrap();

        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_path()))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 9000);
        assert!(!settings.storage.watch_variants);
        assert_eq!(settings.storage.data_dir, PathBuf::from("/var/lib/sales-assist"));
        assert_eq!(settings.promotions.len(), 1);
        assert_eq!(settings.promotions[0].stages, vec!["pre_close", "close"]);
        assert!(settings.validate().is_ok());
    }
}
