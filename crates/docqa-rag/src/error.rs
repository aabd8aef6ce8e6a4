//! Error types for the question-answering pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline and server errors
///
/// The first five variants are the stage-owned failure kinds. Each one is
/// raised by exactly one stage and passed through the orchestrator unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// Document could not be read or parsed
    #[error("Failed to load document '{path}': {message}")]
    Load { path: String, message: String },

    /// Invalid configuration (chunking parameters, credentials, models)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding call failed while building the index
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Empty index or failed query embedding
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Language model call failed or timed out
    #[error("Answer generation failed: {0}")]
    Generation(String),

    /// A stage read a state slot before it was written, or wrote it twice
    #[error("Pipeline state contract violated: {0}")]
    StateContract(String),

    /// Malformed client request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a document load error
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a state contract error
    pub fn state_contract(message: impl Into<String>) -> Self {
        Self::StateContract(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Short machine-readable kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Load { .. } => "load_error",
            Error::Config(_) => "config_error",
            Error::Embedding(_) => "embedding_error",
            Error::Retrieval(_) => "retrieval_error",
            Error::Generation(_) => "generation_error",
            Error::StateContract(_) => "state_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Http(_) => "http_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Every pipeline failure kind maps to the same status
        let status = match &self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "detail": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_errors_share_one_status() {
        let errors = vec![
            Error::load("doc.pdf", "corrupt"),
            Error::config("overlap too large"),
            Error::embedding("quota"),
            Error::retrieval("index is empty"),
            Error::generation("timeout"),
        ];

        for err in errors {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_invalid_request_is_client_error() {
        let response = Error::InvalidRequest("missing query".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_load_error_message_names_path() {
        let err = Error::load("/tmp/a.pdf", "not a PDF");
        assert_eq!(err.to_string(), "Failed to load document '/tmp/a.pdf': not a PDF");
        assert_eq!(err.kind(), "load_error");
    }
}
