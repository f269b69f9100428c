//! Stage sanitization
//!
//! Early stages (integration, discovery, objection handling) must not talk
//! price, send payment links or push meetings. This module strips that
//! content and guarantees the reply still ends in a safe call-to-action.

mod checker;
mod rules;

pub use checker::{sanitize, StageSanitizer};
pub use rules::{
    ForbiddenCategory, ForbiddenRule, StageRules, FORBIDDEN_PATTERNS, SAFE_CTA, SAFE_CTA_MARKERS,
};
