use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Subscription edge row: `subscriber_id` follows `channel_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Response structs (camelCase wire contract)
// ============================================

/// Created-edge fields echoed back by the subscribe half of the toggle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionData {
    pub id: Uuid,
    pub subscriber: Uuid,
    pub channel: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionData {
    fn from(edge: Subscription) -> Self {
        Self {
            id: edge.id,
            subscriber: edge.subscriber_id,
            channel: edge.channel_id,
            created_at: edge.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub is_subscribed: bool,
}

/// Toggle outcome. The subscribe branch carries the created edge inline;
/// the unsubscribe branch carries only the flag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionToggled {
    #[serde(flatten)]
    pub subscription: Option<SubscriptionData>,
    pub is_subscribed: bool,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberSummary {
    pub subscriber: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannel {
    pub channel: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub total_subscribers: i64,
    pub is_subscribed_by_me: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannelsPage {
    pub subscribed_channels: Vec<SubscribedChannel>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_subscribed_channels: i64,
}
