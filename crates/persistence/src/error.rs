//! Persistence errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on snapshot '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot '{name}' is corrupt: {message}")]
    Corrupt { name: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid snapshot name: {0}")]
    InvalidName(String),
}

impl PersistenceError {
    pub fn io(name: &str, source: std::io::Error) -> Self {
        Self::Io {
            name: name.to_string(),
            source,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<PersistenceError> for sales_assist_core::Error {
    fn from(err: PersistenceError) -> Self {
        sales_assist_core::Error::Persistence(err.to_string())
    }
}
