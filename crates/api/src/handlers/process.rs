//! Handler for the trigger endpoint.

use axum::extract::State;

use restyle_pipeline::RunOutcome;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Body when the queue was empty.
pub const IDLE_BODY: &str = "nothing to do";

/// Body when a job was processed.
pub const PROCESSED_BODY: &str = "processed";

/// GET|POST / -- process at most one queued transformation.
///
/// The invocation runs on its own task. Dropping the request (client
/// disconnect) does not cancel it, so a claimed job always reaches
/// `completed` or `failed`. The request body is ignored.
pub async fn process_next(State(state): State<AppState>) -> AppResult<&'static str> {
    let pipeline = state.pipeline.clone();
    let outcome = tokio::spawn(async move { pipeline.run_once().await }).await??;

    match outcome {
        RunOutcome::Idle => Ok(IDLE_BODY),
        RunOutcome::Completed(job) => {
            tracing::info!(
                job_id = %job.job_id,
                preview_url = %job.preview_url,
                "Invocation processed a job"
            );
            Ok(PROCESSED_BODY)
        }
        RunOutcome::Failed { job_id, error } => Err(AppError::JobFailed {
            job_id,
            message: error,
        }),
    }
}
