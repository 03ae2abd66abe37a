//! User notifications for finished transformations.
//!
//! - [`Notifier`]: the seam for "tell this user their preview is ready".
//! - [`delivery::email`]: transactional email over an HTTP API.
//! - [`NotificationDispatcher`]: fires notifications as detached, tracked
//!   tasks whose failures only ever reach the logs.

pub mod delivery;
pub mod dispatcher;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use dispatcher::NotificationDispatcher;

/// Sends the "your render is ready" message.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Notify `to` that the preview at `preview_url` is available.
    async fn send_preview(&self, to: &str, preview_url: &str) -> Result<(), EmailError>;
}
