//! Email notification delivery via a transactional email HTTP API.
//!
//! [`EmailDelivery`] POSTs a JSON message (`from`, `to`, `subject`, `html`)
//! to a Resend-compatible endpoint with a bearer key. Configuration is
//! loaded from environment variables; if `RESEND_API_KEY` is not set,
//! [`EmailConfig::from_env`] returns `None` and no mailer should be
//! constructed.

use std::time::Duration;

use serde::Serialize;

use crate::Notifier;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// The HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The email API rejected the message.
    #[error("Email API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The recipient address is unusable.
    #[error("Invalid recipient address: {0:?}")]
    InvalidRecipient(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default email API endpoint.
const DEFAULT_API_URL: &str = "https://api.resend.com/emails";

/// Default sender identity when `EMAIL_FROM` is not set.
const DEFAULT_FROM: &str = "Restyle Studio <onboarding@resend.dev>";

/// Default subject when `EMAIL_SUBJECT` is not set.
const DEFAULT_SUBJECT: &str = "Your illustration is ready!";

/// HTTP request timeout for a single send.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the email delivery service.
#[derive(Clone)]
pub struct EmailConfig {
    /// Bearer key for the email API.
    pub api_key: String,
    /// Endpoint receiving the JSON message.
    pub api_url: String,
    /// Sender identity, e.g. `Name <addr@domain>`.
    pub from: String,
    /// Subject line.
    pub subject: String,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `RESEND_API_KEY` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable         | Required | Default                                   |
    /// |------------------|----------|-------------------------------------------|
    /// | `RESEND_API_KEY` | yes      | —                                         |
    /// | `EMAIL_API_URL`  | no       | `https://api.resend.com/emails`           |
    /// | `EMAIL_FROM`     | no       | `Restyle Studio <onboarding@resend.dev>`  |
    /// | `EMAIL_SUBJECT`  | no       | `Your illustration is ready!`             |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        Some(Self {
            api_key,
            api_url: std::env::var("EMAIL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            from: std::env::var("EMAIL_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string()),
            subject: std::env::var("EMAIL_SUBJECT")
                .unwrap_or_else(|_| DEFAULT_SUBJECT.to_string()),
        })
    }

    /// Configuration with default endpoint, sender and subject.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            from: DEFAULT_FROM.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .field("subject", &self.subject)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// JSON body accepted by the email API.
#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: String,
}

/// HTML body embedding the preview image.
fn render_html(preview_url: &str) -> String {
    let src = escape_attr(preview_url);
    format!(
        r#"<div style="font-family: Arial, sans-serif; text-align: center;">
  <h2 style="color:#5a3e2b;">Your illustration is ready</h2>
  <p>Here is a preview of your transformed photo.</p>
  <img src="{src}" alt="Illustration preview" style="max-width:100%; border-radius:8px;"/>
  <p style="font-size:12px; color:#888;">If you didn't request this, just ignore this email.</p>
</div>"#
    )
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends preview notification emails through the email API.
pub struct EmailDelivery {
    client: reqwest::Client,
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl Notifier for EmailDelivery {
    async fn send_preview(&self, to: &str, preview_url: &str) -> Result<(), EmailError> {
        if !to.contains('@') {
            return Err(EmailError::InvalidRecipient(to.to_string()));
        }

        let message = OutgoingEmail {
            from: &self.config.from,
            to,
            subject: &self.config.subject,
            html: render_html(preview_url),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(EmailError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to, "Preview email accepted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
