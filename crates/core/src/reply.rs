//! Reply request and response types
//!
//! These are the semantic shapes of the two caller-facing operations.
//! Wire parsing (field aliases, string stages) lives in the server crate.

use serde::{Deserialize, Serialize};

use crate::{Error, Intent, Rating, Result, SalesStage};

/// Default channel when the caller does not name one
pub const DEFAULT_CHANNEL: &str = "web";

/// Request to generate a reply for a customer message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyRequest {
    pub customer_message: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub stage: SalesStage,
    #[serde(default)]
    pub context_note: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    /// Ask for a generated reply instead of a scripted one
    #[serde(default)]
    pub premium: bool,
}

impl ReplyRequest {
    pub fn new(customer_message: impl Into<String>, stage: SalesStage) -> Self {
        Self {
            customer_message: customer_message.into(),
            customer_name: None,
            stage,
            context_note: None,
            channel: None,
            premium: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn with_context_note(mut self, note: impl Into<String>) -> Self {
        self.context_note = Some(note.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn premium(mut self) -> Self {
        self.premium = true;
        self
    }

    /// Reject requests that cannot produce a reply
    pub fn validate(&self) -> Result<()> {
        if self.customer_message.trim().is_empty() {
            return Err(Error::InvalidInput(
                "customer_message must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Trimmed customer name, if any
    pub fn name(&self) -> Option<&str> {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    pub fn channel(&self) -> &str {
        self.channel
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CHANNEL)
    }
}

/// Where the reply text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// Generative provider
    Generated,
    /// Variant store template
    Variants,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Generated => "generated",
            ReplySource::Variants => "variants",
        }
    }
}

/// Promotion whose call-to-action was appended to the reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPromotion {
    pub id: String,
    pub badge: String,
    pub label: String,
}

/// Generated reply with its rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub reply_text: String,
    pub why_text: String,
    pub next_step_text: String,
    pub intent_tag: Intent,
    pub stage: SalesStage,
    pub confidence_score: f32,
    pub source: ReplySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<AppliedPromotion>,
}

/// Rating of a previously shown reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRequest {
    pub intent_tag: Intent,
    pub stage: SalesStage,
    pub reply_text: String,
    pub rating: Rating,
}

impl RatingRequest {
    pub fn validate(&self) -> Result<()> {
        if self.reply_text.trim().is_empty() {
            return Err(Error::InvalidInput("reply_text must not be empty".to_string()));
        }
        Ok(())
    }
}
