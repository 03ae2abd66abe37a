//! Bucket names and deterministic object paths for stored renders.
//!
//! Render paths repeat the bucket name as their first segment, so the
//! hi-res render of job `J1` for user `U1` lives at key
//! `renders-hires/U1/J1.png` inside the `renders-hires` bucket. The same
//! string is what gets persisted on the job row.

use std::time::Duration;

use crate::types::{JobId, UserId};

/// Private bucket holding the user uploads.
pub const ORIGINALS_BUCKET: &str = "uploads-original";

/// Private bucket holding the full-size generated images.
pub const HIRES_BUCKET: &str = "renders-hires";

/// Public bucket holding the downscaled previews.
pub const PREVIEW_BUCKET: &str = "renders-preview-small";

/// Content type every render is stored with.
pub const RENDER_CONTENT_TYPE: &str = "image/png";

/// Lifetime of the signed URL used to read an original upload.
pub const ORIGINAL_URL_TTL: Duration = Duration::from_secs(900);

/// Path of the hi-res render for a job.
///
/// ```
/// use restyle_core::paths::hires_path;
/// use uuid::Uuid;
///
/// let user = Uuid::nil();
/// let job = Uuid::max();
/// assert_eq!(
///     hires_path(user, job),
///     format!("renders-hires/{user}/{job}.png"),
/// );
/// ```
pub fn hires_path(user_id: UserId, job_id: JobId) -> String {
    render_path(HIRES_BUCKET, user_id, job_id)
}

/// Path of the preview render for a job.
pub fn preview_path(user_id: UserId, job_id: JobId) -> String {
    render_path(PREVIEW_BUCKET, user_id, job_id)
}

fn render_path(bucket: &str, user_id: UserId, job_id: JobId) -> String {
    format!("{bucket}/{user_id}/{job_id}.png")
}
