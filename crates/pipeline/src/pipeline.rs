//! The restyle pipeline.
//!
//! Steps run strictly in sequence; nothing fans out. The claim is committed
//! before any external call, so a crash mid-run leaves the row in
//! `processing`.

use std::sync::Arc;

use bytes::Bytes;
use restyle_core::error::CoreError;
use restyle_core::paths::{
    self, HIRES_BUCKET, ORIGINALS_BUCKET, ORIGINAL_URL_TTL, PREVIEW_BUCKET, RENDER_CONTENT_TYPE,
};
use restyle_core::preview::{render_preview, PREVIEW_MAX_DIMENSION};
use restyle_core::types::{JobId, UserId};
use restyle_db::models::transformation::{CompletedRender, Transformation};
use restyle_events::NotificationDispatcher;
use restyle_imagegen::ImageTransformer;
use restyle_storage::ObjectStore;

use crate::error::PipelineError;
use crate::job_store::JobStore;

/// What a single invocation did.
#[derive(Debug)]
pub enum RunOutcome {
    /// No queued job was found; nothing changed.
    Idle,
    /// The claimed job finished and is now `completed`.
    Completed(CompletedJob),
    /// The claimed job hit an error and is now `failed`.
    Failed { job_id: JobId, error: String },
}

/// Details of a successfully processed job.
#[derive(Debug, Clone)]
pub struct CompletedJob {
    pub job_id: JobId,
    pub user_id: UserId,
    pub hires_path: String,
    pub preview_path: String,
    pub preview_url: String,
    /// Whether a notification was dispatched (not whether it was delivered).
    pub notification_dispatched: bool,
}

/// Wires the job store, object storage, image generation and notifications
/// together.
#[derive(Clone)]
pub struct Pipeline {
    jobs: Arc<dyn JobStore>,
    objects: Arc<dyn ObjectStore>,
    transformer: Arc<dyn ImageTransformer>,
    notifications: NotificationDispatcher,
}

impl Pipeline {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        objects: Arc<dyn ObjectStore>,
        transformer: Arc<dyn ImageTransformer>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            jobs,
            objects,
            transformer,
            notifications,
        }
    }

    /// The dispatcher carrying in-flight notifications.
    pub fn notifications(&self) -> &NotificationDispatcher {
        &self.notifications
    }

    /// Process at most one queued job.
    ///
    /// Returns `Err` only when the claim itself fails; no job is touched in
    /// that case. Every error after a successful claim is logged, recorded
    /// on the row as `failed`, and reported as [`RunOutcome::Failed`].
    pub async fn run_once(&self) -> Result<RunOutcome, PipelineError> {
        let Some(job) = self.jobs.claim_next().await? else {
            tracing::debug!("No queued transformation");
            return Ok(RunOutcome::Idle);
        };

        tracing::info!(job_id = %job.id, user_id = %job.user_id, "Claimed transformation");

        match self.process(&job).await {
            Ok(completed) => Ok(RunOutcome::Completed(completed)),
            Err(e) => {
                let error = e.to_string();
                tracing::error!(job_id = %job.id, error = %error, "Transformation failed");
                self.mark_failed(job.id, &error).await;
                Ok(RunOutcome::Failed {
                    job_id: job.id,
                    error,
                })
            }
        }
    }

    #[tracing::instrument(skip_all, fields(job_id = %job.id, user_id = %job.user_id))]
    async fn process(&self, job: &Transformation) -> Result<CompletedJob, PipelineError> {
        let email = self
            .jobs
            .find_user_email(job.user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User email",
                id: job.user_id,
            })?;

        let original_path = job
            .original_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                CoreError::Validation(format!("Job {} is missing original_path", job.id))
            })?;

        let source = self
            .objects
            .fetch_signed(ORIGINALS_BUCKET, original_path, ORIGINAL_URL_TTL)
            .await?;
        tracing::debug!(bytes = source.len(), "Fetched original");

        let hires = Bytes::from(self.transformer.transform(source).await?);
        tracing::debug!(bytes = hires.len(), "Generated hi-res render");

        let hires_path = paths::hires_path(job.user_id, job.id);
        self.objects
            .upload(HIRES_BUCKET, &hires_path, hires.clone(), RENDER_CONTENT_TYPE)
            .await?;

        let preview =
            tokio::task::spawn_blocking(move || render_preview(&hires, PREVIEW_MAX_DIMENSION))
                .await??;
        tracing::debug!(
            width = preview.width,
            height = preview.height,
            bytes = preview.data.len(),
            "Rendered preview"
        );

        let preview_path = paths::preview_path(job.user_id, job.id);
        self.objects
            .upload(
                PREVIEW_BUCKET,
                &preview_path,
                Bytes::from(preview.data),
                RENDER_CONTENT_TYPE,
            )
            .await?;

        let render = CompletedRender {
            hires_path,
            preview_path,
        };
        if !self.jobs.complete(job.id, &render).await? {
            return Err(PipelineError::NotProcessing(job.id));
        }

        let preview_url = self.objects.public_url(PREVIEW_BUCKET, &render.preview_path);
        let notification_dispatched =
            self.notifications
                .dispatch(job.id, email, preview_url.clone());

        tracing::info!(
            hires_path = %render.hires_path,
            preview_path = %render.preview_path,
            "Transformation completed"
        );

        Ok(CompletedJob {
            job_id: job.id,
            user_id: job.user_id,
            hires_path: render.hires_path,
            preview_path: render.preview_path,
            preview_url,
            notification_dispatched,
        })
    }

    /// Record the failure. A failure to do so is logged and otherwise
    /// ignored; the row then stays in `processing`.
    async fn mark_failed(&self, job_id: JobId, error: &str) {
        match self.jobs.fail(job_id, error).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(%job_id, "Job was not processing; failure not recorded")
            }
            Err(e) => {
                tracing::error!(%job_id, error = %e, "Could not mark job as failed")
            }
        }
    }
}
