//! Best-effort, detached notification dispatch.
//!
//! A notification never blocks or fails the job that triggered it. Each
//! send runs as its own task on a [`TaskTracker`], so the process can wait
//! for in-flight sends at shutdown. Errors are logged and dropped.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::Notifier;

/// Spawns notification sends and keeps track of them.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Option<Arc<dyn Notifier>>,
    tracker: TaskTracker,
}

impl NotificationDispatcher {
    /// Dispatcher sending through `notifier`, or a no-op one when `None`.
    pub fn new(notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            notifier,
            tracker: TaskTracker::new(),
        }
    }

    /// A dispatcher that silently skips every notification.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    /// Number of sends still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Fire a preview notification in the background.
    ///
    /// Returns `false` without doing anything when notifications are
    /// disabled. Must be called from within a Tokio runtime.
    pub fn dispatch(&self, job_id: impl Display, to: String, preview_url: String) -> bool {
        let Some(notifier) = self.notifier.clone() else {
            tracing::debug!(job_id = %job_id, "Notifications disabled, skipping email");
            return false;
        };

        let span = tracing::info_span!("notify", job_id = %job_id);
        self.tracker.spawn(
            async move {
                match notifier.send_preview(&to, &preview_url).await {
                    Ok(()) => tracing::info!(to = %to, "Preview notification sent"),
                    Err(e) => tracing::error!(
                        to = %to,
                        error = %e,
                        "Preview notification failed; job status unaffected"
                    ),
                }
            }
            .instrument(span),
        );
        true
    }

    /// Wait until every dispatched send has finished, then keep accepting
    /// new ones.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Stop accepting sends and wait up to `timeout` for in-flight ones.
    ///
    /// Returns `true` if everything finished in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let finished = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        if !finished {
            tracing::warn!(
                pending = self.tracker.len(),
                "Notification sends still running at shutdown"
            );
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::EmailError;

    #[derive(Default)]
    struct Counting {
        sent: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Notifier for Counting {
        async fn send_preview(&self, _to: &str, _url: &str) -> Result<(), EmailError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait::async_trait]
    impl Notifier for Failing {
        async fn send_preview(&self, to: &str, _url: &str) -> Result<(), EmailError> {
            Err(EmailError::InvalidRecipient(to.to_string()))
        }
    }

    struct Slow;

    #[async_trait::async_trait]
    impl Notifier for Slow {
        async fn send_preview(&self, _to: &str, _url: &str) -> Result<(), EmailError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn disabled_dispatcher_skips() {
        let dispatcher = NotificationDispatcher::disabled();
        assert!(!dispatcher.is_enabled());
        assert!(!dispatcher.dispatch("J1", "u1@example.com".into(), "https://x".into()));
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn dispatch_runs_in_background_and_drains() {
        let notifier = Arc::new(Counting::default());
        let dispatcher = NotificationDispatcher::new(Some(notifier.clone()));

        assert!(dispatcher.dispatch("J1", "u1@example.com".into(), "https://x".into()));
        dispatcher.drain().await;
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);

        // Still usable after draining.
        assert!(dispatcher.dispatch("J2", "u1@example.com".into(), "https://x".into()));
        dispatcher.drain().await;
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_send_is_swallowed() {
        let dispatcher = NotificationDispatcher::new(Some(Arc::new(Failing)));
        assert!(dispatcher.dispatch("J1", "u1@example.com".into(), "https://x".into()));
        dispatcher.drain().await;
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_gives_up_after_timeout() {
        let dispatcher = NotificationDispatcher::new(Some(Arc::new(Slow)));
        dispatcher.dispatch("J1", "u1@example.com".into(), "https://x".into());
        assert!(!dispatcher.shutdown(Duration::from_secs(5)).await);
    }
}
