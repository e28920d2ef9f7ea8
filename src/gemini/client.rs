// Gemini API client for invoice questions
// Author: kelexine (https://github.com/kelexine)

use crate::config::{ApiKey, GeminiConfig, API_KEY_ENV};
use crate::error::{ExtractorError, Result};
use crate::extractor::{InferenceRequest, InvoiceModel};
use crate::metrics;
use crate::models::gemini::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use crate::utils::logging::sanitize;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Client for the public Google Gemini API.
///
/// The API key is taken from the `GeminiConfig` handed to [`GeminiClient::new`].
/// A missing key does not prevent construction; every call then fails with
/// a configuration error before touching the network.
pub struct GeminiClient {
    http_client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| ExtractorError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created HTTP client for {}", config.api_base_url);

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    /// Whether an API key was configured at startup.
    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Get the API base_url
    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn api_key(&self) -> Result<&ApiKey> {
        self.config.api_key.as_ref().ok_or_else(|| {
            ExtractorError::Configuration(format!(
                "{} is not set; no API credential available to authenticate with Gemini",
                API_KEY_ENV
            ))
        })
    }

    fn endpoint(&self, method: &str) -> String {
        let model = self.config.model.trim_start_matches("models/");
        format!(
            "{}/models/{}:{}",
            self.config.api_base_url.trim_end_matches('/'),
            model,
            method
        )
    }

    /// Build the single user turn: instruction, image, question, in that order.
    pub fn build_request(request: &InferenceRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::text(request.system_prompt),
                Part::InlineData {
                    inline_data: request.image.to_inline_data(),
                },
                Part::text(request.user_prompt.clone()),
            ])],
            generation_config: None,
        }
    }

    /// Call Gemini `generateContent` API (blocking, single attempt).
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let api_key = self.api_key()?;
        let url = self.endpoint("generateContent");
        debug!("Calling generateContent API for model: {}", self.config.model);

        let start = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key.expose())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                metrics::record_gemini_call(&self.config.model, 0, start.elapsed().as_secs_f64());
                ExtractorError::Inference(format!("HTTP error: {}", e))
            })?;

        let status = response.status();
        metrics::record_gemini_call(
            &self.config.model,
            status.as_u16(),
            start.elapsed().as_secs_f64(),
        );

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Gemini API error: HTTP {} - Response body: {}",
                status,
                sanitize(&error_text)
            );
            return Err(Self::classify_error(status.as_u16(), &error_text));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ExtractorError::Inference(format!("Failed to read response body: {}", e)))?;

        debug!(
            "Raw Gemini response (first 500 chars): {}",
            response_text.chars().take(500).collect::<String>()
        );

        serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            ExtractorError::Inference(format!("Response parsing error: {}", e))
        })
    }

    /// Map a non-2xx response to an error, keeping Google's message.
    fn classify_error(status: u16, body: &str) -> ExtractorError {
        let message = Self::extract_error_message(body).unwrap_or_else(|| body.to_string());
        let rejected_key = body.contains("API_KEY_INVALID")
            || message.to_lowercase().contains("api key not valid");

        match status {
            401 | 403 => ExtractorError::Authentication(message),
            400 if rejected_key => ExtractorError::Authentication(message),
            _ => ExtractorError::Inference(format!("HTTP {}: {}", status, message)),
        }
    }

    /// Extract error message from API response JSON
    fn extract_error_message(response_text: &str) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(serde::Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(response_text) {
            if let Some(error) = error_resp.error {
                return error.message.or(error.status);
            }
        }
        None
    }

    /// Check connectivity to Gemini API.
    ///
    /// Sends a minimal `generateContent` request ("hi") to verify the API is
    /// reachable and the key is accepted.
    pub async fn check_connectivity(&self) -> Result<Duration> {
        let start = Instant::now();

        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text("hi")])],
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(1),
                temperature: None,
            }),
        };

        self.generate_content(&request).await?;

        let latency = start.elapsed();
        debug!("API connectivity check passed in {:?}", latency);
        Ok(latency)
    }
}

/// Answer text of the first candidate, or why there is none.
fn extract_answer(response: &GenerateContentResponse) -> Result<String> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
            return Err(ExtractorError::Inference(msg));
        }
    }

    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| ExtractorError::Inference("No candidates in Gemini response".into()))?;

    response.first_text().ok_or_else(|| {
        let reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN");
        ExtractorError::Inference(format!(
            "Gemini returned no text (finish reason: {})",
            reason
        ))
    })
}

#[async_trait]
impl InvoiceModel for GeminiClient {
    async fn infer(&self, request: &InferenceRequest) -> Result<String> {
        let body = Self::build_request(request);
        let response = self.generate_content(&body).await?;
        extract_answer(&response)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_auth_errors() {
        let body = json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{"reason": "API_KEY_INVALID"}]
            }
        })
        .to_string();

        let err = GeminiClient::classify_error(400, &body);
        assert!(matches!(err, ExtractorError::Authentication(_)));
        assert!(err.to_string().contains("API key not valid"));

        assert!(matches!(
            GeminiClient::classify_error(403, "{}"),
            ExtractorError::Authentication(_)
        ));
    }

    #[test]
    fn test_classify_other_errors() {
        let body = json!({"error": {"message": "Request payload size exceeds the limit"}}).to_string();
        let err = GeminiClient::classify_error(400, &body);
        assert!(matches!(err, ExtractorError::Inference(_)));
        assert!(err.to_string().contains("HTTP 400: Request payload size exceeds the limit"));

        let err = GeminiClient::classify_error(500, "upstream exploded");
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[test]
    fn test_extract_answer_blocked_prompt() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        let err = extract_answer(&response).unwrap_err();
        assert!(err.to_string().contains("Prompt blocked: SAFETY"));
    }

    #[test]
    fn test_extract_answer_empty_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "RECITATION"}]
        }))
        .unwrap();
        let err = extract_answer(&response).unwrap_err();
        assert!(err.to_string().contains("RECITATION"));
    }

    #[test]
    fn test_endpoint_strips_models_prefix() {
        let config = GeminiConfig {
            api_base_url: "http://localhost:1234/v1beta/".to_string(),
            model: "models/gemini-1.5-flash".to_string(),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("generateContent"),
            "http://localhost:1234/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
