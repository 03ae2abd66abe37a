//! Transformation job rows.

use restyle_core::error::CoreError;
use restyle_core::types::{JobId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

use super::status::{StatusId, TransformationStatus};

/// A row from the `transformations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transformation {
    pub id: JobId,
    pub user_id: UserId,
    pub original_path: Option<String>,
    pub status_id: StatusId,
    pub hires_path: Option<String>,
    pub preview_path: Option<String>,
    pub error_message: Option<String>,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Transformation {
    /// Decode `status_id` into the typed status.
    pub fn status(&self) -> Result<TransformationStatus, CoreError> {
        TransformationStatus::from_id(self.status_id)
    }
}

/// Insert payload for a freshly uploaded request.
///
/// Rows are normally created by the upload flow; the worker only uses this
/// in tests and local seeding.
#[derive(Debug, Clone)]
pub struct CreateTransformation {
    pub user_id: UserId,
    pub original_path: Option<String>,
}

/// Output locations written when a job completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRender {
    pub hires_path: String,
    pub preview_path: String,
}
