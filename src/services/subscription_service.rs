use crate::domain::subscription::NewSubscription;
use crate::error::Result;
use crate::storage::DbPool;
use crate::storage::subscription_repo::SubscriptionRepository;

#[derive(Clone, Debug)]
pub struct SubscriptionService {
    pool: DbPool,
    repo: SubscriptionRepository,
}

impl SubscriptionService {
    #[must_use]
    pub const fn new(pool: DbPool, repo: SubscriptionRepository) -> Self {
        Self { pool, repo }
    }

    /// Registers or updates a subscription, keyed by endpoint.
    ///
    /// # Errors
    /// Returns a database error if the write fails.
    pub async fn subscribe(&self, subscription: &NewSubscription) -> Result<i64> {
        self.repo.upsert(&self.pool, subscription).await
    }

    /// Removes a subscription by endpoint. Returns how many records were
    /// removed (0 or 1).
    ///
    /// # Errors
    /// Returns a database error if the deletion fails.
    pub async fn unsubscribe(&self, endpoint: &str) -> Result<u64> {
        self.repo.remove_by_endpoint(&self.pool, endpoint).await
    }

    /// Current number of stored subscriptions.
    ///
    /// # Errors
    /// Returns a database error if the query fails.
    pub async fn count(&self) -> Result<i64> {
        self.repo.count(&self.pool).await
    }
}
