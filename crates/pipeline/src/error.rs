use restyle_core::error::CoreError;
use restyle_core::preview::PreviewError;
use restyle_core::types::JobId;
use restyle_imagegen::ImageGenError;
use restyle_storage::StorageError;

/// Anything that can go wrong while processing a claimed job.
///
/// The pipeline does not tell transient from permanent failures; every
/// variant ends the job as `failed`.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Missing precondition on the job or its owner.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Image generation failed: {0}")]
    Generation(#[from] ImageGenError),

    #[error("Preview rendering failed: {0}")]
    Preview(#[from] PreviewError),

    /// The blocking preview task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The row was no longer `processing` when the result was written.
    #[error("Job {0} is no longer processing")]
    NotProcessing(JobId),
}
