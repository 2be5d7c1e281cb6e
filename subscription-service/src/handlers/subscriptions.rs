use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::db::subscription_repo::{search_pattern, ChannelRow};
use crate::db::{SubscriptionRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequesterId;
use crate::models::{
    SubscribedChannel, SubscribedChannelsPage, SubscriptionStatus, SubscriptionToggled,
};
use crate::response::ApiResponse;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

// ============================================
// Query params
// ============================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub user_id: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// ============================================
// Shared helpers
// ============================================

fn parse_channel_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("invalid channel id".to_string()))
}

/// Resolve the listing target: explicit userId query param, or the requester.
fn resolve_target(user_id: Option<&str>, requester: RequesterId) -> Result<Uuid> {
    match user_id {
        Some(raw) => {
            Uuid::parse_str(raw).map_err(|_| AppError::Validation("invalid user id".to_string()))
        }
        None => Ok(requester.0),
    }
}

/// Normalize page/limit and derive the offset. Saturating math: a huge but
/// well-formed page number must land past the data, not overflow.
fn normalize_page(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = page.saturating_sub(1).saturating_mul(limit);
    (page, limit, offset)
}

/// `ceil(total / limit)` for `limit > 0`
fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

async fn require_user(pool: &PgPool, user_id: Uuid) -> Result<()> {
    if UserRepository::exists(pool, user_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("user not found".to_string()))
    }
}

// ============================================
// Handlers
// ============================================

/// GET /api/v1/subscriptions/{channel_id}/status
pub async fn check_subscription_status(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
    requester: RequesterId,
) -> Result<HttpResponse> {
    let channel_id = parse_channel_id(&path.into_inner())?;

    let is_subscribed =
        SubscriptionRepository::is_subscribed(&pool, requester.0, channel_id).await?;

    Ok(ApiResponse::ok(
        SubscriptionStatus { is_subscribed },
        "subscription status fetched",
    ))
}

/// POST /api/v1/subscriptions/{channel_id}/toggle
///
/// Insert-first toggle: the unique (subscriber, channel) constraint makes
/// the insert and the fallback delete each atomic, so concurrent toggles
/// for the same pair cannot create duplicate edges.
pub async fn toggle_subscription(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
    requester: RequesterId,
) -> Result<HttpResponse> {
    let channel_id = parse_channel_id(&path.into_inner())?;

    if channel_id == requester.0 {
        return Err(AppError::Validation(
            "cannot subscribe to your own channel".to_string(),
        ));
    }
    require_user(&pool, channel_id).await?;

    match SubscriptionRepository::subscribe(&pool, requester.0, channel_id).await? {
        Some(subscription) => Ok(ApiResponse::created(
            SubscriptionToggled {
                subscription: Some(subscription.into()),
                is_subscribed: true,
            },
            "subscribed",
        )),
        None => {
            let removed =
                SubscriptionRepository::unsubscribe(&pool, requester.0, channel_id).await?;
            if !removed {
                // A concurrent unsubscribe already removed the edge; the
                // outcome the caller asked for holds either way.
                debug!(
                    "toggle no-op: {} -> {} already unsubscribed",
                    requester.0, channel_id
                );
            }
            Ok(ApiResponse::ok(
                SubscriptionToggled {
                    subscription: None,
                    is_subscribed: false,
                },
                "unsubscribed",
            ))
        }
    }
}

/// GET /api/v1/subscriptions/subscribers?userId=&page=&limit=
pub async fn list_channel_subscribers(
    query: web::Query<ListQuery>,
    pool: web::Data<PgPool>,
    requester: RequesterId,
) -> Result<HttpResponse> {
    let channel_id = resolve_target(query.user_id.as_deref(), requester)?;
    require_user(&pool, channel_id).await?;

    let (page, limit, offset) = normalize_page(query.page, query.limit);
    debug!(
        "listing subscribers: channel={} page={} limit={}",
        channel_id, page, limit
    );

    let subscribers =
        SubscriptionRepository::list_subscribers(&pool, channel_id, limit, offset).await?;

    Ok(ApiResponse::ok(subscribers, "subscribers fetched"))
}

/// GET /api/v1/subscriptions/channels?userId=&page=&limit=
pub async fn list_subscribed_channels(
    query: web::Query<ListQuery>,
    pool: web::Data<PgPool>,
    requester: RequesterId,
) -> Result<HttpResponse> {
    let target_id = resolve_target(query.user_id.as_deref(), requester)?;
    require_user(&pool, target_id).await?;

    let (page, limit, offset) = normalize_page(query.page, query.limit);

    let total = SubscriptionRepository::count_subscribed(&pool, target_id).await?;
    let rows = SubscriptionRepository::list_subscribed(&pool, target_id, limit, offset).await?;

    let body = build_channels_page(&pool, requester, rows, total, page, limit).await?;
    Ok(ApiResponse::ok(body, "subscribed channels fetched"))
}

/// GET /api/v1/subscriptions/channels/search?userId=&search=&page=&limit=
pub async fn search_subscribed_channels(
    query: web::Query<SearchQuery>,
    pool: web::Data<PgPool>,
    requester: RequesterId,
) -> Result<HttpResponse> {
    let target_id = resolve_target(query.user_id.as_deref(), requester)?;
    require_user(&pool, target_id).await?;

    let (page, limit, offset) = normalize_page(query.page, query.limit);
    let pattern = search_pattern(query.search.as_deref().unwrap_or(""));

    let total =
        SubscriptionRepository::count_subscribed_matching(&pool, target_id, &pattern).await?;
    let rows = SubscriptionRepository::list_subscribed_matching(
        &pool, target_id, &pattern, limit, offset,
    )
    .await?;

    let body = build_channels_page(&pool, requester, rows, total, page, limit).await?;
    Ok(ApiResponse::ok(body, "subscribed channels fetched"))
}

/// Shape a page of channel rows, resolving `isSubscribedByMe` with a single
/// batched lookup over exactly the page's channel ids.
async fn build_channels_page(
    pool: &PgPool,
    requester: RequesterId,
    rows: Vec<ChannelRow>,
    total: i64,
    page: i64,
    limit: i64,
) -> Result<SubscribedChannelsPage> {
    let channel_ids: Vec<Uuid> = rows.iter().map(|(id, ..)| *id).collect();
    let subscribed_by_me =
        SubscriptionRepository::batch_check_subscribed(pool, requester.0, &channel_ids).await?;

    let subscribed_channels = rows
        .into_iter()
        .map(
            |(channel, username, full_name, avatar, total_subscribers)| SubscribedChannel {
                channel,
                username,
                full_name,
                avatar,
                total_subscribers,
                is_subscribed_by_me: subscribed_by_me.get(&channel).copied().unwrap_or(false),
            },
        )
        .collect();

    Ok(SubscribedChannelsPage {
        subscribed_channels,
        current_page: page,
        total_pages: total_pages(total, limit),
        total_subscribed_channels: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_id_rejects_malformed_input() {
        assert!(matches!(
            parse_channel_id("not-a-uuid"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(parse_channel_id(""), Err(AppError::Validation(_))));
        assert!(parse_channel_id("7d3f0a48-9a0e-4b1d-8a4e-2f6d7c9b1e23").is_ok());
    }

    #[test]
    fn test_resolve_target_defaults_to_requester() {
        let requester = RequesterId(Uuid::new_v4());
        assert_eq!(resolve_target(None, requester).unwrap(), requester.0);

        let other = Uuid::new_v4();
        assert_eq!(
            resolve_target(Some(&other.to_string()), requester).unwrap(),
            other
        );
        assert!(resolve_target(Some("bogus"), requester).is_err());
    }

    #[test]
    fn test_normalize_page_defaults_and_clamps() {
        assert_eq!(normalize_page(None, None), (1, 10, 0));
        assert_eq!(normalize_page(Some(3), Some(20)), (3, 20, 40));
        assert_eq!(normalize_page(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(normalize_page(Some(-5), Some(10_000)), (1, 100, 0));
    }

    #[test]
    fn test_normalize_page_saturates_on_extreme_page() {
        let (page, limit, offset) = normalize_page(Some(i64::MAX), Some(100));
        assert_eq!(page, i64::MAX);
        assert_eq!(limit, 100);
        assert_eq!(offset, i64::MAX);
    }

    #[test]
    fn test_total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(25, 1), 25);
    }
}
