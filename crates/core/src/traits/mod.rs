//! Core traits for pluggable collaborators

mod generator;

pub use generator::{ReplyGenerator, ReplyPrompt};
