//! Promotion definitions
//!
//! Promotions are time-boxed offers. Empty tag sets mean "no restriction"
//! for that dimension.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A time-boxed promotional offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default)]
    pub intents: Vec<String>,
    #[serde(default)]
    pub badge: String,
    #[serde(default)]
    pub label: String,
    pub short_cta: String,
}

impl Promotion {
    /// Check the definition is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "promotions.id".to_string(),
                message: "Promotion id must not be empty".to_string(),
            });
        }
        if self.ends_at < self.starts_at {
            return Err(ConfigError::InvalidValue {
                field: format!("promotions.{}.ends_at", self.id),
                message: "ends_at is before starts_at".to_string(),
            });
        }
        if self.short_cta.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("promotions.{}.short_cta", self.id),
                message: "short_cta must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
