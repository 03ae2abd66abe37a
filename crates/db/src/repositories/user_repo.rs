//! Read-only access to the `users` table.

use restyle_core::types::UserId;
use sqlx::PgPool;

/// Looks up requester details. The worker never writes users.
pub struct UserRepo;

impl UserRepo {
    /// Fetch a user's email address.
    ///
    /// Returns `None` both when the user does not exist and when the row has
    /// no email on file.
    pub async fn find_email(pool: &PgPool, id: UserId) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(Option<String>,)> = sqlx::query_as("SELECT email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row
            .and_then(|(email,)| email)
            .filter(|email| !email.trim().is_empty()))
    }
}
