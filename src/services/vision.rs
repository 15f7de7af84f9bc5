use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use serde::Deserialize;
use tracing::debug;

use crate::core::errors::VisionError;
use crate::core::types::Detection;
use crate::services::auth::TokenBroker;

const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com";

/// OCR over raw image bytes.
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// First text annotation detected in the image, or None when the service
    /// reports no text at all. Later annotations (per-word and per-region
    /// detections) are discarded.
    async fn detect_text(&self, image: &[u8]) -> Result<Option<Detection>, VisionError>;
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(rename = "textAnnotations", default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
    // Absent on most annotations; the protobuf default is the empty string.
    #[serde(default)]
    locale: String,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// One TEXT_DETECTION request with the image bytes inlined as base64.
fn annotate_body(image: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "requests": [{
            "image": { "content": general_purpose::STANDARD.encode(image) },
            "features": [{ "type": "TEXT_DETECTION" }]
        }]
    })
}

/// Pull the first annotation out of the batch response.
fn first_detection(response: AnnotateResponse) -> Result<Option<Detection>, VisionError> {
    let image_response = response
        .responses
        .into_iter()
        .next()
        .ok_or(VisionError::MissingResponse)?;

    if let Some(status) = image_response.error {
        return Err(VisionError::Api {
            code: status.code,
            message: status.message,
        });
    }

    Ok(image_response
        .text_annotations
        .into_iter()
        .next()
        .map(|annotation| Detection {
            text: annotation.description,
            locale: annotation.locale,
        }))
}

/// Cloud Vision `images:annotate` client.
pub struct VisionClient {
    http: reqwest::Client,
    tokens: TokenBroker,
    endpoint: String,
}

impl VisionClient {
    pub fn new(http: reqwest::Client, tokens: TokenBroker) -> Self {
        Self::with_endpoint(http, tokens, DEFAULT_ENDPOINT)
    }

    /// Same client against a different base URL. Test seam.
    pub fn with_endpoint(
        http: reqwest::Client,
        tokens: TokenBroker,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TextDetector for VisionClient {
    async fn detect_text(&self, image: &[u8]) -> Result<Option<Detection>, VisionError> {
        debug!(size = image.len(), "requesting text annotation");

        let token = self.tokens.bearer().await?;
        let response = self
            .http
            .post(format!("{}/v1/images:annotate", self.endpoint))
            .bearer_auth(token)
            .json(&annotate_body(image))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Status { status, body });
        }

        let text = response.text().await?;
        let parsed: AnnotateResponse = serde_json::from_str(&text)?;
        first_detection(parsed)
    }
}
