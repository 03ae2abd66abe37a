/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default image model.
const DEFAULT_MODEL: &str = "gpt-image-1";

/// Settings for the image-generation API.
#[derive(Clone)]
pub struct ImageGenConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// Base URL; `/images/edits` is appended.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
}

impl ImageGenConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `OPENAI_API_KEY` is not set.
    ///
    /// | Variable             | Required | Default                     |
    /// |----------------------|----------|-----------------------------|
    /// | `OPENAI_API_KEY`     | yes      | —                           |
    /// | `OPENAI_BASE_URL`    | no       | `https://api.openai.com/v1` |
    /// | `OPENAI_IMAGE_MODEL` | no       | `gpt-image-1`               |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        Some(Self {
            api_key,
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("OPENAI_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        })
    }

    /// Configuration with default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

// Keep the API key out of logs.
impl std::fmt::Debug for ImageGenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageGenConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}
