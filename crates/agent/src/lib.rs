//! Sales assistant reply orchestration
//!
//! Features:
//! - Weighted variant selection with a fallback chain
//! - Stage-aware explanations and next steps
//! - Time-boxed promotions appended as a short call-to-action
//! - Optional premium replies from a generative backend
//! - Shown/rating bookkeeping through the stats aggregator

pub mod assistant;
pub mod explain;
pub mod prompt;
pub mod promotions;
pub mod variants;

pub use assistant::SalesAssistant;
pub use explain::{build_next_step, build_why, intent_rationale, WhyContext};
pub use prompt::build_reply_prompt;
pub use promotions::{append_cta, is_active, PromotionContext, PromotionSelector};
pub use variants::{
    pick_weighted, Resolution, Variant, VariantStore, VariantSummary, VariantTable,
    BUILTIN_GREETING, DEFAULT_INTENT_KEY,
};
