//! In-memory doubles for driving a [`Pipeline`](crate::Pipeline) without
//! Postgres or network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use restyle_core::types::{JobId, UserId};
use restyle_db::models::status::TransformationStatus;
use restyle_db::models::transformation::{CompletedRender, Transformation};
use restyle_events::{EmailError, Notifier};
use restyle_imagegen::client::decode_image;
use restyle_imagegen::{ImageGenError, ImageTransformer};
use tokio::sync::Mutex;

use crate::job_store::JobStore;

// ---------------------------------------------------------------------------
// Job store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct State {
    /// Jobs in queue order.
    jobs: Vec<Transformation>,
    emails: HashMap<UserId, Option<String>>,
}

/// [`JobStore`] holding rows in memory with the same guarded transitions as
/// the Postgres repository.
#[derive(Default)]
pub struct InMemoryJobStore {
    state: Mutex<State>,
    fail_claims: AtomicBool,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user, optionally with an email address.
    pub async fn insert_user(&self, user_id: UserId, email: Option<&str>) {
        self.state
            .lock()
            .await
            .emails
            .insert(user_id, email.map(str::to_string));
    }

    /// Append a `queued` job.
    pub async fn queue(&self, job_id: JobId, user_id: UserId, original_path: Option<&str>) {
        let now = Utc::now();
        self.state.lock().await.jobs.push(Transformation {
            id: job_id,
            user_id,
            original_path: original_path.map(str::to_string),
            status_id: TransformationStatus::Queued.id(),
            hires_path: None,
            preview_path: None,
            error_message: None,
            claimed_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        });
    }

    /// Snapshot of a job row.
    pub async fn get(&self, job_id: JobId) -> Option<Transformation> {
        self.state
            .lock()
            .await
            .jobs
            .iter()
            .find(|j| j.id == job_id)
            .cloned()
    }

    /// Make every subsequent claim fail with a pool error.
    pub fn fail_claims(&self, fail: bool) {
        self.fail_claims.store(fail, Ordering::SeqCst);
    }

    async fn transition(
        &self,
        job_id: JobId,
        next: TransformationStatus,
        apply: impl FnOnce(&mut Transformation),
    ) -> bool {
        let mut state = self.state.lock().await;
        state
            .jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .is_some_and(|job| advance(job, next, apply))
    }
}

/// Move `job` to `next` if the state machine allows it from its current
/// status.
fn advance(
    job: &mut Transformation,
    next: TransformationStatus,
    apply: impl FnOnce(&mut Transformation),
) -> bool {
    let allowed = job
        .status()
        .is_ok_and(|current| current.can_transition_to(next));
    if allowed {
        apply(job);
        job.status_id = next.id();
        job.updated_at = Utc::now();
    }
    allowed
}

#[async_trait::async_trait]
impl JobStore for InMemoryJobStore {
    async fn claim_next(&self) -> Result<Option<Transformation>, sqlx::Error> {
        if self.fail_claims.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let mut state = self.state.lock().await;
        let Some(job) = state
            .jobs
            .iter_mut()
            .find(|j| j.status_id == TransformationStatus::Queued.id())
        else {
            return Ok(None);
        };
        advance(job, TransformationStatus::Processing, |job| {
            job.claimed_at = Some(Utc::now());
        });
        Ok(Some(job.clone()))
    }

    async fn find_user_email(&self, user_id: UserId) -> Result<Option<String>, sqlx::Error> {
        Ok(self
            .state
            .lock()
            .await
            .emails
            .get(&user_id)
            .cloned()
            .flatten()
            .filter(|e| !e.trim().is_empty()))
    }

    async fn complete(
        &self,
        job_id: JobId,
        render: &CompletedRender,
    ) -> Result<bool, sqlx::Error> {
        Ok(self
            .transition(job_id, TransformationStatus::Completed, |job| {
                job.hires_path = Some(render.hires_path.clone());
                job.preview_path = Some(render.preview_path.clone());
                job.completed_at = Some(Utc::now());
            })
            .await)
    }

    async fn fail(&self, job_id: JobId, error: &str) -> Result<bool, sqlx::Error> {
        Ok(self
            .transition(job_id, TransformationStatus::Failed, |job| {
                job.error_message = Some(error.to_string());
            })
            .await)
    }
}

// ---------------------------------------------------------------------------
// Transformer
// ---------------------------------------------------------------------------

enum Reply {
    Body(String),
    Api { status: u16, body: String },
}

/// [`ImageTransformer`] answering every call with the same canned reply.
pub struct ScriptedTransformer {
    reply: Reply,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedTransformer {
    /// Decode `body` exactly as a successful API response would be.
    pub fn from_api_body(body: impl Into<String>) -> Self {
        Self {
            reply: Reply::Body(body.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every call with a non-2xx API status.
    pub fn api_error(status: u16, body: impl Into<String>) -> Self {
        Self {
            reply: Reply::Api {
                status,
                body: body.into(),
            },
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` before answering, like a slow upstream.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageTransformer for ScriptedTransformer {
    async fn transform(&self, _source: Vec<u8>) -> Result<Vec<u8>, ImageGenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Reply::Body(body) => decode_image(body),
            Reply::Api { status, body } => Err(ImageGenError::Api {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// [`Notifier`] remembering every `(to, preview_url)` it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records sends but reports each one as rejected.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send_preview(&self, to: &str, preview_url: &str) -> Result<(), EmailError> {
        self.sent
            .lock()
            .await
            .push((to.to_string(), preview_url.to_string()));
        if self.fail {
            return Err(EmailError::HttpStatus {
                status: 500,
                body: "rejected".into(),
            });
        }
        Ok(())
    }
}
