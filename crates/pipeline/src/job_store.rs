//! The pipeline's view of the job queue.

use restyle_core::types::{JobId, UserId};
use restyle_db::models::transformation::{CompletedRender, Transformation};
use restyle_db::repositories::{TransformationRepo, UserRepo};
use restyle_db::DbPool;

/// Queue and user lookups the pipeline needs.
#[async_trait::async_trait]
pub trait JobStore: Send + Sync {
    /// Claim one queued job, moving it to `processing`.
    async fn claim_next(&self) -> Result<Option<Transformation>, sqlx::Error>;

    /// Email address of the requesting user, if one is on file.
    async fn find_user_email(&self, user_id: UserId) -> Result<Option<String>, sqlx::Error>;

    /// `processing → completed` with both render paths.
    async fn complete(&self, job_id: JobId, render: &CompletedRender)
        -> Result<bool, sqlx::Error>;

    /// `processing → failed`.
    async fn fail(&self, job_id: JobId, error: &str) -> Result<bool, sqlx::Error>;
}

/// [`JobStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgJobStore {
    pool: DbPool,
}

impl PgJobStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl JobStore for PgJobStore {
    async fn claim_next(&self) -> Result<Option<Transformation>, sqlx::Error> {
        TransformationRepo::claim_next(&self.pool).await
    }

    async fn find_user_email(&self, user_id: UserId) -> Result<Option<String>, sqlx::Error> {
        UserRepo::find_email(&self.pool, user_id).await
    }

    async fn complete(
        &self,
        job_id: JobId,
        render: &CompletedRender,
    ) -> Result<bool, sqlx::Error> {
        TransformationRepo::complete(&self.pool, job_id, render).await
    }

    async fn fail(&self, job_id: JobId, error: &str) -> Result<bool, sqlx::Error> {
        TransformationRepo::fail(&self.pool, job_id, error).await
    }
}
