// Error types for invoice-lens
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    MissingInput(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Gemini API error: {0}")]
    Inference(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractorError {
    /// Stable machine-readable error type used in JSON responses and metrics labels.
    pub fn error_type(&self) -> &'static str {
        match self {
            ExtractorError::Configuration(_) | ExtractorError::ConfigParsing(_) => "configuration_error",
            ExtractorError::MissingInput(_) => "missing_input_error",
            ExtractorError::Authentication(_) => "authentication_error",
            ExtractorError::InvalidRequest(_) => "invalid_request_error",
            ExtractorError::Inference(_) | ExtractorError::Http(_) => "api_error",
            _ => "internal_error",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ExtractorError::MissingInput(_) | ExtractorError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ExtractorError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ExtractorError::Inference(_) | ExtractorError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Convert ExtractorError to HTTP responses for the JSON API
impl IntoResponse for ExtractorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "type": "error",
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ExtractorError>;
