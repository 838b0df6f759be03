use crate::domain::subscription::{Subscription, SubscriptionKeys};
use time::OffsetDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct SubscriptionRecord {
    pub id: i64,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<SubscriptionRecord> for Subscription {
    fn from(record: SubscriptionRecord) -> Self {
        Self {
            id: record.id,
            endpoint: record.endpoint,
            keys: SubscriptionKeys { p256dh: record.p256dh, auth: record.auth },
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
