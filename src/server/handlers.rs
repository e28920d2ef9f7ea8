// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::page::{self, ViewState};
use super::routes::AppState;
use crate::error::{ExtractorError, Result};
use crate::extractor::{self, SYSTEM_PROMPT};
use crate::metrics;
use crate::vision::models::FALLBACK_MIME_TYPE;
use crate::vision::{package, ImageFormat, Upload};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Form field carrying the question.
pub const PROMPT_FIELD: &str = "prompt";
/// Form field carrying the invoice image.
pub const IMAGE_FIELD: &str = "image";

/// `GET /`: the page with nothing submitted.
pub async fn index_handler() -> Html<String> {
    Html(ViewState::Idle.render(""))
}

/// `POST /extract`: the HTML submit. Every outcome is rendered as a page.
pub async fn extract_page_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let (prompt, upload) = collect_input(multipart).await;
    let view = match upload {
        Ok(upload) => page::submit(state.model.as_ref(), upload, &prompt).await,
        Err(e) => ViewState::Failed {
            message: e.to_string(),
        },
    };

    metrics::record_extract("page", view.outcome());
    Html(view.render(&prompt))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub response: String,
    pub model: String,
}

/// `POST /api/extract`: the same submit, answered as JSON.
pub async fn extract_api_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>> {
    let result = async {
        let (prompt, upload) = collect_input(multipart).await;
        let image = package(upload?)?;
        extractor::infer(state.model.as_ref(), SYSTEM_PROMPT, image, &prompt).await
    }
    .await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(ExtractorError::MissingInput(_)) => "warning",
        Err(_) => "failed",
    };
    metrics::record_extract("api", outcome);

    Ok(Json(ExtractResponse {
        response: result?,
        model: state.model.model_name().to_string(),
    }))
}

/// Read the `prompt` and `image` fields of a multipart submit.
///
/// Browsers send an empty, unnamed file part when nothing was chosen; that
/// becomes `Upload::Absent`. Unknown fields are ignored. The prompt read before
/// a malformed or oversized part is still returned alongside the error.
pub async fn collect_input(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> (String, Result<Upload>) {
    let mut prompt = String::new();
    let upload = read_fields(multipart, &mut prompt).await;

    match &upload {
        Ok(upload) => info!(
            "Received submit: prompt_len={}, image_present={}",
            prompt.len(),
            upload.is_present()
        ),
        Err(e) => warn!("Unreadable submit: prompt_len={}, error={}", prompt.len(), e),
    }
    (prompt, upload)
}

async fn read_fields(
    multipart: std::result::Result<Multipart, MultipartRejection>,
    prompt: &mut String,
) -> Result<Upload> {
    let mut multipart =
        multipart.map_err(|e| ExtractorError::InvalidRequest(e.body_text()))?;
    let mut upload = Upload::Absent;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ExtractorError::InvalidRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(PROMPT_FIELD) => {
                *prompt = field
                    .text()
                    .await
                    .map_err(|e| ExtractorError::InvalidRequest(e.body_text()))?;
            }
            Some(IMAGE_FIELD) => {
                let file_name = field.file_name().map(str::to_string).filter(|n| !n.is_empty());
                let mime_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ExtractorError::InvalidRequest(e.body_text()))?;

                upload = if bytes.is_empty() && file_name.is_none() {
                    Upload::Absent
                } else {
                    if ImageFormat::from_mime_type(&mime_type).is_none() {
                        debug!("Passing through unlisted MIME type {}", mime_type);
                    }
                    Upload::Present {
                        mime_type,
                        bytes,
                        file_name,
                    }
                };
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(upload)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

/// `GET /health`: liveness plus configuration status. Never calls the model.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    let credential_check = if state.config.gemini.api_key.is_some() {
        HealthCheck {
            status: "ok".to_string(),
            message: "API key configured".to_string(),
        }
    } else {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "error".to_string(),
            message: format!("{} is not set", crate::config::API_KEY_ENV),
        }
    };
    checks.insert("credential".to_string(), credential_check);

    checks.insert(
        "model".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!("Model: {}", state.model.model_name()),
        },
    );

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}
