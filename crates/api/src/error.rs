use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use restyle_pipeline::PipelineError;

/// Application-level error type for HTTP handlers.
///
/// Callers of the trigger only ever see a plain-text `error` body; details
/// go to the logs.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The pipeline could not even claim a job.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The invocation task panicked.
    #[error("Invocation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A claimed job ended as `failed`.
    #[error("Job {job_id} failed: {message}")]
    JobFailed {
        job_id: uuid::Uuid,
        message: String,
    },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Body returned for every error.
pub const ERROR_BODY: &str = "error";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Pipeline(err) => {
                tracing::error!(error = %err, "Invocation failed before a job was claimed")
            }
            AppError::Task(err) => {
                tracing::error!(error = %err, "Invocation task did not finish")
            }
            AppError::JobFailed { job_id, message } => {
                tracing::warn!(%job_id, error = %message, "Invocation ended with a failed job")
            }
        }
        (StatusCode::INTERNAL_SERVER_ERROR, ERROR_BODY).into_response()
    }
}
