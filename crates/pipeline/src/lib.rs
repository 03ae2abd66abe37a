//! One-job-per-invocation restyle pipeline.
//!
//! [`Pipeline::run_once`] claims a queued transformation, generates the
//! restyled image, stores the hi-res render and its preview, marks the job
//! completed and hands the preview link to the notifier. Any failure after
//! the claim marks the job failed instead.

pub mod error;
pub mod job_store;
pub mod pipeline;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::PipelineError;
pub use job_store::{JobStore, PgJobStore};
pub use pipeline::{CompletedJob, Pipeline, RunOutcome};
