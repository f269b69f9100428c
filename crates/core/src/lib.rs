//! Core traits and types for the sales assistant
//!
//! This crate provides the vocabulary shared by every other crate:
//! - Intent tags and funnel stages
//! - Rating values and their win contribution
//! - Reply request/response types
//! - The `ReplyGenerator` trait for pluggable generative backends
//! - Error types

pub mod error;
pub mod intent;
pub mod rating;
pub mod reply;
pub mod stage;
pub mod traits;

pub use error::{Error, Result};
pub use intent::Intent;
pub use rating::Rating;
pub use reply::{AppliedPromotion, RatingRequest, ReplyRequest, ReplyResponse, ReplySource};
pub use stage::SalesStage;
pub use traits::{ReplyGenerator, ReplyPrompt};
