//! Text processing for the sales assistant
//!
//! This crate provides the pure text transforms used on the reply path:
//! - **Intent Classification**: ordered keyword rules, first match wins
//! - **Stage Sanitization**: strips pricing, scheduling and payment-link
//!   content from early-stage replies and guarantees a safe call-to-action
//! - **Tidy**: collapses duplicate greetings and repeated punctuation
//! - **Signatures**: normalized projection of reply text used as stats key
//!
//! # Example
//!
//! ```
//! use sales_assist_core::{Intent, SalesStage};
//! use sales_assist_text_processing::{classify, sanitize};
//!
//! assert_eq!(classify("no tengo tiempo para esto"), Intent::Time);
//!
//! let clean = sanitize("Hola Ana, el precio es de $200.", SalesStage::Discovery);
//! assert!(!clean.contains("$200"));
//! ```

pub mod compliance;
pub mod intent;
pub mod signature;
pub mod tidy;

pub use compliance::{sanitize, ForbiddenCategory, StageRules, StageSanitizer, SAFE_CTA};
pub use intent::{classify, classify_detailed, Classification, IntentClassifier};
pub use signature::{fold_accents, text_signature};
pub use tidy::tidy;
