use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Key material the push service needs to encrypt payloads for an endpoint.
/// Opaque base64url strings; never interpreted by this server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A registered browser push endpoint, as stored.
#[derive(Clone, Debug)]
pub struct Subscription {
    pub id: i64,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Subscription data as received from the browser, before it is stored.
#[derive(Clone, Debug, Deserialize)]
pub struct NewSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}
