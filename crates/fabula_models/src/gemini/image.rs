//! Gemini image client.
//!
//! Every request passes through the shared [`ImageCallGate`] before it
//! hits the network, so covers, reference sheets, and page illustrations
//! from any number of concurrent pipelines respect one global minimum
//! interval.

use crate::gemini::wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, Part,
};
use crate::gemini::{API_KEY_VAR, BASE_URL};
use async_trait::async_trait;
use base64::Engine;
use fabula_error::{FabulaResult, ImageGenError, ImageGenErrorKind};
use fabula_interface::{ImageGenerator, ImageRequest};
use fabula_rate_limit::ImageCallGate;
use reqwest::Client;
use tracing::{debug, instrument};

/// Gemini-backed image generator.
#[derive(Debug, Clone)]
pub struct GeminiImageGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    gate: ImageCallGate,
}

impl GeminiImageGenerator {
    /// Create a client for `model`, reading the API key from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is not set.
    #[instrument(skip_all)]
    pub fn new(model: impl Into<String>, gate: ImageCallGate) -> FabulaResult<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| ImageGenError::new(ImageGenErrorKind::MissingApiKey))?;
        Ok(Self::with_api_key(api_key, model, gate))
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(
        api_key: impl Into<String>,
        model: impl Into<String>,
        gate: ImageCallGate,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            model: model.into(),
            gate,
        }
    }

    /// Model name in use.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    #[instrument(skip(self, request), fields(references = request.references.len(), aspect = %request.aspect_ratio))]
    async fn generate_image(&self, request: &ImageRequest) -> FabulaResult<Vec<u8>> {
        self.gate.wait().await;

        let mut parts = vec![Part::text(request.prompt.clone())];
        for reference in &request.references {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&reference.data);
            parts.push(Part::inline_data(reference.mime.clone(), encoded));
        }

        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: Some(ImageConfig {
                    aspect_ratio: request.aspect_ratio.to_string(),
                }),
            }),
        };

        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        debug!(url = %url, model = %self.model, "Sending image generation request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ImageGenError::new(ImageGenErrorKind::ApiRequest(format!(
                    "Request failed: {}",
                    e
                )))
            })?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ImageGenError::new(ImageGenErrorKind::HttpError {
                status_code,
                message,
            })
            .into());
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            ImageGenError::new(ImageGenErrorKind::ApiRequest(format!(
                "Failed to parse response body: {}",
                e
            )))
        })?;

        let inline = body
            .inline_data()
            .ok_or_else(|| ImageGenError::new(ImageGenErrorKind::NoImageData))?;

        let data = base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|e| ImageGenError::new(ImageGenErrorKind::Base64Decode(e.to_string())))?;

        debug!(size = data.len(), mime = %inline.mime_type, "Decoded generated image");
        Ok(data)
    }
}
