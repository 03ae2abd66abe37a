//! Client for the external image-generation API.
//!
//! [`ImageTransformer`] is the seam the pipeline depends on;
//! [`OpenAiImageClient`] implements it against an OpenAI-compatible
//! `/images/edits` endpoint.

pub mod client;
pub mod config;

pub use client::OpenAiImageClient;
pub use config::ImageGenConfig;

/// Errors from the image-generation layer. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum ImageGenError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Image API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The success body was not the expected JSON.
    #[error("Invalid image API response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    /// The response carried no generated image.
    #[error("Image API response missing image")]
    MissingImage,

    /// The generated image was not valid base64.
    #[error("Generated image is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Restyles a source image into a new one.
#[async_trait::async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Send `source` with the fixed style prompt and return the generated
    /// image bytes.
    async fn transform(&self, source: Vec<u8>) -> Result<Vec<u8>, ImageGenError>;
}
