/// Transformation job identifier (`transformations.id`).
pub type JobId = uuid::Uuid;

/// Requesting user identifier (`users.id`).
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
