use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};

pub struct UserRepository;

impl UserRepository {
    /// Check that a target user id refers to an existing user.
    pub async fn exists(pool: &PgPool, user_id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to check user existence: {}", e);
                    AppError::Database(e)
                })?;

        Ok(exists)
    }
}
