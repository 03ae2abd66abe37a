//! HTTP client for an OpenAI-compatible image edit endpoint.
//!
//! Sends `POST {base_url}/images/edits` as multipart form data and decodes
//! the base64 image from the JSON reply.

use base64::Engine;
use restyle_core::prompt::{OUTPUT_SIZE, SOURCE_FILENAME, STYLE_PROMPT};
use serde::Deserialize;

use crate::config::ImageGenConfig;
use crate::{ImageGenError, ImageTransformer};

/// MIME type the source image part is labelled with.
const SOURCE_MIME: &str = "image/png";

/// Body of a successful `/images/edits` call.
#[derive(Debug, Deserialize)]
struct EditResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    b64_json: Option<String>,
}

/// Image-generation client holding a pooled [`reqwest::Client`].
pub struct OpenAiImageClient {
    client: reqwest::Client,
    config: ImageGenConfig,
}

impl OpenAiImageClient {
    pub fn new(config: ImageGenConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn edits_url(&self) -> String {
        format!("{}/images/edits", self.config.base_url.trim_end_matches('/'))
    }

    fn build_form(&self, source: Vec<u8>) -> Result<reqwest::multipart::Form, ImageGenError> {
        let image = reqwest::multipart::Part::bytes(source)
            .file_name(SOURCE_FILENAME)
            .mime_str(SOURCE_MIME)?;

        Ok(reqwest::multipart::Form::new()
            .text("model", self.config.model.clone())
            .text("prompt", STYLE_PROMPT)
            .text("size", OUTPUT_SIZE)
            .part("image", image))
    }

    /// Ensure the response has a success status code, otherwise capture
    /// status and body in [`ImageGenError::Api`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ImageGenError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ImageGenError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl ImageTransformer for OpenAiImageClient {
    async fn transform(&self, source: Vec<u8>) -> Result<Vec<u8>, ImageGenError> {
        let source_bytes = source.len();
        let form = self.build_form(source)?;

        tracing::debug!(
            model = %self.config.model,
            size = OUTPUT_SIZE,
            source_bytes,
            "Submitting image edit request"
        );

        let response = self
            .client
            .post(self.edits_url())
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let body = Self::ensure_success(response).await?.text().await?;
        let image = decode_image(&body)?;

        tracing::debug!(image_bytes = image.len(), "Image edit returned");
        Ok(image)
    }
}

/// Extract and decode `data[0].b64_json` from a success body.
pub fn decode_image(body: &str) -> Result<Vec<u8>, ImageGenError> {
    let parsed: EditResponse = serde_json::from_str(body)?;
    let b64 = parsed
        .data
        .into_iter()
        .next()
        .and_then(|image| image.b64_json)
        .filter(|b64| !b64.is_empty())
        .ok_or(ImageGenError::MissingImage)?;
    Ok(base64::engine::general_purpose::STANDARD.decode(b64)?)
}
