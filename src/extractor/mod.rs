//! Invoice question answering.
//!
//! An [`InferenceRequest`] is the ordered triple sent to the model: the fixed
//! [`SYSTEM_PROMPT`], the packaged invoice image and the user's question.
//! [`InvoiceModel`] is the seam between the page and the hosted model;
//! `GeminiClient` implements it for production and tests substitute fakes.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::error::Result;
use crate::vision::UploadedImage;
use async_trait::async_trait;

/// Instruction that frames every request.
pub const SYSTEM_PROMPT: &str = "
You are an expert in understanding invoices.
You will receive input images as invoices and
you will have to answer questions based on the input image.
";

/// One question about one invoice image.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub system_prompt: &'static str,
    pub image: UploadedImage,
    /// Free text, possibly empty.
    pub user_prompt: String,
}

impl InferenceRequest {
    pub fn new(image: UploadedImage, user_prompt: impl Into<String>) -> Self {
        Self::with_system_prompt(SYSTEM_PROMPT, image, user_prompt)
    }

    pub fn with_system_prompt(
        system_prompt: &'static str,
        image: UploadedImage,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt,
            image,
            user_prompt: user_prompt.into(),
        }
    }
}

/// A multimodal model that can answer questions about an invoice image.
///
/// Each call is one independent remote request: no caching, no retries.
/// Dropping the returned future cancels the call.
#[async_trait]
pub trait InvoiceModel: Send + Sync {
    /// Returns the answer text of the first response candidate.
    async fn infer(&self, request: &InferenceRequest) -> Result<String>;

    /// Model identifier, for logs and metrics.
    fn model_name(&self) -> &str;
}

/// Build the request triple and ask `model`.
pub async fn infer(
    model: &dyn InvoiceModel,
    system_prompt: &'static str,
    image: UploadedImage,
    user_prompt: &str,
) -> Result<String> {
    let request = InferenceRequest::with_system_prompt(system_prompt, image, user_prompt);
    model.infer(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::{package, Upload};
    use bytes::Bytes;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<InferenceRequest>>,
    }

    #[async_trait]
    impl InvoiceModel for Recorder {
        async fn infer(&self, request: &InferenceRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok("invoice number 17".to_string())
        }

        fn model_name(&self) -> &str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn test_infer_builds_ordered_request() {
        let model = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        let image = package(Upload::Present {
            mime_type: "image/jpeg".to_string(),
            bytes: Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0]),
            file_name: None,
        })
        .unwrap();

        let answer = infer(&model, SYSTEM_PROMPT, image.clone(), "What is the total?")
            .await
            .unwrap();
        assert!(!answer.is_empty());

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system_prompt, SYSTEM_PROMPT);
        assert_eq!(seen[0].image, image);
        assert_eq!(seen[0].user_prompt, "What is the total?");
    }

    #[test]
    fn test_system_prompt_mentions_invoices() {
        assert!(SYSTEM_PROMPT.contains("expert in understanding invoices"));
    }
}
