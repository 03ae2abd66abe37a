//! Repository for the `transformations` queue table.
//!
//! Status transitions use `TransformationStatus` from `models::status`.
//! Every transition is a conditional update on the current status, so a
//! row only ever moves forward through `queued → processing → terminal`.

use restyle_core::types::JobId;
use sqlx::PgPool;

use crate::models::status::TransformationStatus;
use crate::models::transformation::{CompletedRender, CreateTransformation, Transformation};

/// Column list for `transformations` queries.
const COLUMNS: &str = "\
    id, user_id, original_path, status_id, hires_path, preview_path, \
    error_message, claimed_at, completed_at, created_at, updated_at";

/// Provides queue operations for transformation jobs.
pub struct TransformationRepo;

impl TransformationRepo {
    /// Insert a new `queued` job.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransformation,
    ) -> Result<Transformation, sqlx::Error> {
        let query = format!(
            "INSERT INTO transformations (user_id, original_path, status_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transformation>(&query)
            .bind(input.user_id)
            .bind(&input.original_path)
            .bind(TransformationStatus::Queued.id())
            .fetch_one(pool)
            .await
    }

    /// Find a job by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: JobId,
    ) -> Result<Option<Transformation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transformations WHERE id = $1");
        sqlx::query_as::<_, Transformation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim one queued job, moving it to `processing`.
    ///
    /// The inner `SELECT ... FOR UPDATE SKIP LOCKED` keeps two overlapping
    /// invocations from claiming the same row. Oldest request first.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Transformation>, sqlx::Error> {
        let query = format!(
            "UPDATE transformations \
             SET status_id = $1, claimed_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM transformations \
                 WHERE status_id = $2 \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transformation>(&query)
            .bind(TransformationStatus::Processing.id())
            .bind(TransformationStatus::Queued.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a processing job as completed with both render paths.
    ///
    /// Returns `false` if the job was not in `processing`.
    pub async fn complete(
        pool: &PgPool,
        id: JobId,
        render: &CompletedRender,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transformations \
             SET status_id = $2, hires_path = $3, preview_path = $4, completed_at = NOW() \
             WHERE id = $1 AND status_id = $5",
        )
        .bind(id)
        .bind(TransformationStatus::Completed.id())
        .bind(&render.hires_path)
        .bind(&render.preview_path)
        .bind(TransformationStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a processing job as failed, recording why.
    ///
    /// Returns `false` if the job was not in `processing`. No retry is ever
    /// scheduled.
    pub async fn fail(pool: &PgPool, id: JobId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transformations \
             SET status_id = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(TransformationStatus::Failed.id())
        .bind(error)
        .bind(TransformationStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
