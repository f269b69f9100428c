//! Error types shared across the sales assistant

use thiserror::Error;

/// Result alias used by the core traits
pub type Result<T> = std::result::Result<T, Error>;

/// Core error taxonomy
///
/// Input errors are rejected before any state is touched. Collaborator
/// failures (`Generation`, `Persistence`) are recovered by callers on the
/// reply path and only surface from explicit admin operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error was caused by the caller's input
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::InvalidRating(_))
    }

    /// Short machine-readable kind, used in HTTP error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::InvalidRating(_) => "invalid_rating",
            Error::Generation(_) => "generation",
            Error::Persistence(_) => "persistence",
            Error::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_distinguishable() {
        assert!(Error::InvalidInput("empty".into()).is_input_error());
        assert!(Error::InvalidRating("great".into()).is_input_error());
        assert!(!Error::Generation("timeout".into()).is_input_error());
        assert_eq!(Error::InvalidRating("x".into()).kind(), "invalid_rating");
    }
}
