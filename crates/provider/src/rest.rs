//! REST implementation of [`GenerationProvider`] against the configured
//! AI gateway.
//!
//! Wire format: JSON with base64-encoded image payloads. Every request
//! carries a bearer token and a correlation id so gateway logs can be
//! tied back to a render job.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::settings::ProviderSettings;
use crate::{GenerateImageRequest, GeneratedImage, GenerationProvider};

/// Per-image cost estimate in EUR by image model. Unknown models fall
/// back to [`DEFAULT_IMAGE_COST`].
const IMAGE_COST_TABLE: &[(&str, f64)] = &[("atelier-xl", 0.08), ("atelier-turbo", 0.02)];

/// Fallback per-image cost for models missing from the table.
const DEFAULT_IMAGE_COST: f64 = 0.05;

/// Cost estimate for one generated image with the given model.
pub fn estimate_image_cost(model: &str) -> f64 {
    IMAGE_COST_TABLE
        .iter()
        .find(|(m, _)| *m == model)
        .map(|(_, cost)| *cost)
        .unwrap_or(DEFAULT_IMAGE_COST)
}

/// HTTP client for the AI gateway.
pub struct RestProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

#[derive(Debug, Deserialize)]
struct TextResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    image_b64: String,
}

impl RestProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    /// Create a provider reusing an existing [`reqwest::Client`]
    /// (connection pooling across runs).
    pub fn with_client(client: reqwest::Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ProviderError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(path, request_id = %request_id, "Calling AI gateway");
        let response = self
            .client
            .post(format!("{}{path}", self.settings.base_url))
            .bearer_auth(&self.settings.api_key)
            .header("x-request-id", &request_id)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GenerationProvider for RestProvider {
    async fn enrich(
        &self,
        system_instruction: &str,
        user_instruction: &str,
    ) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "model": self.settings.text_model,
            "system": system_instruction,
            "prompt": user_instruction,
        });
        let response: TextResponse = self.post_json("/v1/text/complete", &body).await?;
        Ok(response.text)
    }

    async fn generate_image(
        &self,
        request: &GenerateImageRequest,
    ) -> Result<GeneratedImage, ProviderError> {
        let references: Vec<String> = request
            .reference_images
            .iter()
            .map(|bytes| BASE64.encode(bytes))
            .collect();

        let mut body = serde_json::json!({
            "model": self.settings.image_model,
            "prompt": request.prompt,
            "aspect_ratio": request.aspect_ratio.as_str(),
            "reference_images": references,
        });
        if let Some((width, height)) = request.size_hint {
            body["size_hint"] = serde_json::json!({ "width": width, "height": height });
        }
        if let Some(source) = &request.source_image {
            body["source_image"] = serde_json::Value::String(BASE64.encode(source));
        }

        let response: ImageResponse = self.post_json("/v1/images/generate", &body).await?;
        let bytes = BASE64
            .decode(&response.image_b64)
            .map_err(|e| ProviderError::Decode(format!("invalid base64 image payload: {e}")))?;
        if bytes.is_empty() {
            return Err(ProviderError::Decode("empty image payload".to_string()));
        }

        Ok(GeneratedImage {
            bytes,
            cost_estimate: estimate_image_cost(&self.settings.image_model),
        })
    }

    async fn analyze_consistency(
        &self,
        image: &[u8],
        instruction: &str,
    ) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "model": self.settings.analysis_model,
            "image_b64": BASE64.encode(image),
            "instruction": instruction,
        });
        let response: TextResponse = self.post_json("/v1/images/analyze", &body).await?;
        Ok(response.text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
