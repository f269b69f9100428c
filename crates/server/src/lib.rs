//! Sales Assistant Server
//!
//! HTTP endpoints for reply generation, ratings, stats and admin reloads.

pub mod http;
pub mod metrics;
pub mod state;
pub mod watcher;

pub use http::create_router;
pub use metrics::{init_metrics, record_error, record_rating, record_reply};
pub use state::AppState;
pub use watcher::spawn_variants_watcher;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "invalid_input",
            ServerError::InvalidRating(_) => "invalid_rating",
            ServerError::Persistence(_) => "persistence",
            ServerError::Config(_) => "config",
            ServerError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) | ServerError::InvalidRating(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Persistence(_) | ServerError::Config(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sales_assist_core::Error> for ServerError {
    fn from(err: sales_assist_core::Error) -> Self {
        use sales_assist_core::Error;
        match err {
            Error::InvalidInput(msg) => ServerError::InvalidRequest(msg),
            Error::InvalidRating(msg) => ServerError::InvalidRating(msg),
            Error::Persistence(msg) => ServerError::Persistence(msg),
            Error::Config(msg) => ServerError::Config(msg),
            Error::Generation(msg) => ServerError::Internal(msg),
        }
    }
}

impl From<sales_assist_persistence::PersistenceError> for ServerError {
    fn from(err: sales_assist_persistence::PersistenceError) -> Self {
        ServerError::Persistence(err.to_string())
    }
}

impl From<sales_assist_config::ConfigError> for ServerError {
    fn from(err: sales_assist_config::ConfigError) -> Self {
        ServerError::Config(err.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for ServerError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        record_error(self.kind());

        (
            status,
            Json(serde_json::json!({
                "error": self.kind(),
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
