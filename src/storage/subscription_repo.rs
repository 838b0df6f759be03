use crate::domain::subscription::{NewSubscription, Subscription};
use crate::error::{AppError, Result};
use crate::storage::DbPool;
use crate::storage::records::SubscriptionRecord;
use time::OffsetDateTime;

#[derive(Clone, Debug, Default)]
pub struct SubscriptionRepository {}

impl SubscriptionRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Inserts or replaces a subscription by endpoint. Re-subscription from
    /// the same browser refreshes the key material and `updated_at` while
    /// keeping the row id and `created_at`.
    ///
    /// # Errors
    /// Returns a database error if the write fails.
    pub async fn upsert(&self, pool: &DbPool, subscription: &NewSubscription) -> Result<i64> {
        let now = OffsetDateTime::now_utc();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO subscriptions (endpoint, p256dh, auth, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT(endpoint) DO UPDATE SET
                p256dh = excluded.p256dh,
                auth = excluded.auth,
                updated_at = excluded.updated_at
            RETURNING id
            "#,
        )
        .bind(&subscription.endpoint)
        .bind(&subscription.keys.p256dh)
        .bind(&subscription.keys.auth)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(id)
    }

    /// Point-in-time snapshot of every stored subscription, in insertion
    /// order.
    ///
    /// # Errors
    /// Returns a database error if the query fails.
    pub async fn list_all(&self, pool: &DbPool) -> Result<Vec<Subscription>> {
        let records: Vec<SubscriptionRecord> = sqlx::query_as(
            "SELECT id, endpoint, p256dh, auth, created_at, updated_at FROM subscriptions ORDER BY id",
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(records.into_iter().map(Subscription::from).collect())
    }

    /// Removes one subscription by endpoint. Returns 0 or 1.
    ///
    /// # Errors
    /// Returns a database error if the deletion fails.
    pub async fn remove_by_endpoint(&self, pool: &DbPool, endpoint: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE endpoint = $1")
            .bind(endpoint)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    /// Removes a batch of subscriptions in a single statement. Safe to call
    /// with an empty set: no statement is issued and 0 is returned.
    ///
    /// # Errors
    /// Returns a database error if the deletion fails.
    pub async fn remove_many(&self, pool: &DbPool, endpoints: &[String]) -> Result<u64> {
        if endpoints.is_empty() {
            return Ok(0);
        }

        let mut builder: sqlx::QueryBuilder<'_, sqlx::Sqlite> =
            sqlx::QueryBuilder::new("DELETE FROM subscriptions WHERE endpoint IN (");
        let mut separated = builder.separated(", ");
        for endpoint in endpoints {
            separated.push_bind(endpoint);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(pool).await.map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    /// Current number of stored subscriptions.
    ///
    /// # Errors
    /// Returns a database error if the query fails.
    pub async fn count(&self, pool: &DbPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(count)
    }
}
