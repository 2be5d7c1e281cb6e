/// Subscription edge repository (subscriber -> channel)
use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{SubscriberSummary, Subscription};

/// Channel summary row: (channel_id, username, full_name, avatar_url, total_subscribers)
pub type ChannelRow = (Uuid, String, String, Option<String>, i64);

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    /// Check whether subscriber follows channel
    pub async fn is_subscribed(
        pool: &PgPool,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM subscriptions
                WHERE subscriber_id = $1 AND channel_id = $2
            )
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check subscription status: {}", e);
            AppError::Database(e)
        })?;

        Ok(exists)
    }

    /// Create the edge if it does not exist. Returns the created edge, or
    /// `None` when the (subscriber, channel) pair was already present. The
    /// unique constraint makes this the atomic first half of the toggle.
    pub async fn subscribe(
        pool: &PgPool,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<Option<Subscription>> {
        let created = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (id, subscriber_id, channel_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (subscriber_id, channel_id) DO NOTHING
            RETURNING id, subscriber_id, channel_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create subscription: {}", e);
            AppError::Database(e)
        })?;

        Ok(created)
    }

    /// Delete the edge. Returns true if a row was removed.
    pub async fn unsubscribe(
        pool: &PgPool,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<bool> {
        let affected = sqlx::query(
            "DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2",
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete subscription: {}", e);
            AppError::Database(e)
        })?
        .rows_affected();

        Ok(affected > 0)
    }

    /// Count channels a user is subscribed to
    pub async fn count_subscribed(pool: &PgPool, subscriber_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = $1")
                .bind(subscriber_id)
                .fetch_one(pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count subscribed channels: {}", e);
                    AppError::Database(e)
                })?;

        Ok(count)
    }

    /// Count subscribed channels whose username or full name matches
    pub async fn count_subscribed_matching(
        pool: &PgPool,
        subscriber_id: Uuid,
        pattern: &str,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
              AND (u.username ILIKE $2 OR u.full_name ILIKE $2)
            "#,
        )
        .bind(subscriber_id)
        .bind(pattern)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count matching subscribed channels: {}", e);
            AppError::Database(e)
        })?;

        Ok(count)
    }

    /// Paginated subscriber summaries for a channel, newest first
    pub async fn list_subscribers(
        pool: &PgPool,
        channel_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubscriberSummary>> {
        let subscribers = sqlx::query_as::<_, SubscriberSummary>(
            r#"
            SELECT s.subscriber_id AS subscriber, u.username, u.full_name, u.avatar_url AS avatar
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = $1
            ORDER BY s.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(channel_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list subscribers: {}", e);
            AppError::Database(e)
        })?;

        Ok(subscribers)
    }

    /// Paginated channel summaries a user is subscribed to, each with its
    /// own subscriber count, newest subscription first
    pub async fn list_subscribed(
        pool: &PgPool,
        subscriber_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChannelRow>> {
        let rows = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT s.channel_id, u.username, u.full_name, u.avatar_url,
                   (SELECT COUNT(*) FROM subscriptions sc
                    WHERE sc.channel_id = s.channel_id) AS total_subscribers
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(subscriber_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list subscribed channels: {}", e);
            AppError::Database(e)
        })?;

        Ok(rows)
    }

    /// Same as `list_subscribed`, filtered by a case-insensitive match on
    /// username or full name
    pub async fn list_subscribed_matching(
        pool: &PgPool,
        subscriber_id: Uuid,
        pattern: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChannelRow>> {
        let rows = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT s.channel_id, u.username, u.full_name, u.avatar_url,
                   (SELECT COUNT(*) FROM subscriptions sc
                    WHERE sc.channel_id = s.channel_id) AS total_subscribers
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
              AND (u.username ILIKE $2 OR u.full_name ILIKE $2)
            ORDER BY s.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(subscriber_id)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search subscribed channels: {}", e);
            AppError::Database(e)
        })?;

        Ok(rows)
    }

    /// Batch check which of the given channels the requester is subscribed
    /// to. One query over exactly the page's channel ids.
    /// Returns a map of channel_id -> is_subscribed.
    pub async fn batch_check_subscribed(
        pool: &PgPool,
        subscriber_id: Uuid,
        channel_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, bool>> {
        if channel_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let subscribed: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT channel_id
            FROM subscriptions
            WHERE subscriber_id = $1 AND channel_id = ANY($2)
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to batch check subscriptions: {}", e);
            AppError::Database(e)
        })?;

        let subscribed_set: HashSet<Uuid> = subscribed.into_iter().collect();
        Ok(channel_ids
            .iter()
            .map(|id| (*id, subscribed_set.contains(id)))
            .collect())
    }
}

/// Build an ILIKE pattern that treats the search term as a literal
/// substring. An empty term yields `%%`, which matches every channel.
pub fn search_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
