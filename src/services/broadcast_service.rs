use crate::domain::delivery::{BroadcastResult, DeliveryOutcome, DeliveryStatus};
use crate::domain::notification::NotificationPayload;
use crate::domain::subscription::{NewSubscription, Subscription};
use crate::error::{AppError, Result};
use crate::services::push::transport::{PushTransport, TransportError};
use crate::storage::DbPool;
use crate::storage::subscription_repo::SubscriptionRepository;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[derive(Clone, Debug)]
pub struct BroadcastService {
    pool: DbPool,
    repo: SubscriptionRepository,
    transport: Arc<dyn PushTransport>,
    delivery_timeout: Duration,
}

impl BroadcastService {
    #[must_use]
    pub fn new(
        pool: DbPool,
        repo: SubscriptionRepository,
        transport: Arc<dyn PushTransport>,
        delivery_timeout: Duration,
    ) -> Self {
        Self { pool, repo, transport, delivery_timeout }
    }

    /// Dispatches one delivery attempt per recipient, all concurrently, and
    /// waits for every attempt to settle. Each settlement is classified into
    /// a [`DeliveryOutcome`]; a per-recipient failure never aborts the
    /// broadcast, and the store is never touched here.
    pub async fn dispatch(&self, payload: &[u8], recipients: &[Subscription]) -> Vec<DeliveryOutcome> {
        let attempts = recipients.iter().map(|subscription| self.attempt(subscription, payload));
        futures::future::join_all(attempts).await
    }

    async fn attempt(&self, subscription: &Subscription, payload: &[u8]) -> DeliveryOutcome {
        let sent =
            tokio::time::timeout(self.delivery_timeout, self.transport.send(&subscription.endpoint, &subscription.keys, payload))
                .await;

        let outcome = match sent {
            Ok(Ok(())) => DeliveryOutcome {
                endpoint: subscription.endpoint.clone(),
                status: DeliveryStatus::Delivered,
                detail: None,
            },
            Ok(Err(TransportError::Gone)) => DeliveryOutcome {
                endpoint: subscription.endpoint.clone(),
                status: DeliveryStatus::PermanentlyGone,
                detail: Some("Push service reported the endpoint gone".to_string()),
            },
            Ok(Err(TransportError::Other(e))) => DeliveryOutcome {
                endpoint: subscription.endpoint.clone(),
                status: DeliveryStatus::TransientFailure,
                detail: Some(e.to_string()),
            },
            Err(_) => DeliveryOutcome {
                endpoint: subscription.endpoint.clone(),
                status: DeliveryStatus::TransientFailure,
                detail: Some(format!("Delivery attempt timed out after {}s", self.delivery_timeout.as_secs())),
            },
        };

        match outcome.status {
            DeliveryStatus::Delivered => {
                tracing::debug!(endpoint = %outcome.endpoint, "Notification delivered");
            }
            DeliveryStatus::PermanentlyGone => {
                tracing::info!(endpoint = %outcome.endpoint, "Endpoint permanently gone, marking for removal");
            }
            DeliveryStatus::TransientFailure => {
                tracing::warn!(
                    endpoint = %outcome.endpoint,
                    detail = outcome.detail.as_deref().unwrap_or_default(),
                    "Delivery attempt failed"
                );
            }
        }

        outcome
    }

    /// Removes subscriptions the push service confirmed permanently gone.
    /// No-op for an empty retire set.
    ///
    /// # Errors
    /// Returns a database error if the deletion fails.
    pub async fn reconcile(&self, retired: &[String]) -> Result<u64> {
        if retired.is_empty() {
            return Ok(0);
        }

        let removed = self.repo.remove_many(&self.pool, retired).await?;
        tracing::info!(removed, "Removed subscriptions rejected by the push service");
        Ok(removed)
    }

    /// Full broadcast flow: snapshot the subscriber set, fan the payload out,
    /// reconcile the retire set, and recount. Returns `None` when there are
    /// no subscribers (the engine is not invoked at all).
    ///
    /// # Errors
    /// Returns a database error if the snapshot, reconciliation or recount
    /// fails. Per-recipient delivery failures never surface here.
    pub async fn broadcast_to_all(&self, payload: &NotificationPayload) -> Result<Option<BroadcastResult>> {
        let recipients = self.repo.list_all(&self.pool).await?;
        if recipients.is_empty() {
            return Ok(None);
        }

        let bytes = serde_json::to_vec(payload).map_err(|_| AppError::Internal)?;
        tracing::info!(recipients = recipients.len(), title = %payload.title, "Broadcasting notification");

        let outcomes = self.dispatch(&bytes, &recipients).await;

        let delivered = outcomes.iter().filter(|o| o.status == DeliveryStatus::Delivered).count();
        let retired: Vec<String> = outcomes
            .iter()
            .filter(|o| o.status == DeliveryStatus::PermanentlyGone)
            .map(|o| o.endpoint.clone())
            .collect();

        self.reconcile(&retired).await?;
        let remaining = self.repo.count(&self.pool).await?;

        Ok(Some(BroadcastResult { attempted: outcomes.len(), delivered, retired, remaining }))
    }

    /// Best-effort welcome notification after a successful subscribe. Runs
    /// detached; the outcome is logged and never reaches the HTTP response
    /// that confirmed the subscription.
    pub fn send_welcome(&self, subscription: NewSubscription, payload: NotificationPayload) {
        let transport = Arc::clone(&self.transport);
        let timeout = self.delivery_timeout;

        tokio::spawn(
            async move {
                let bytes = match serde_json::to_vec(&payload) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to encode welcome payload");
                        return;
                    }
                };

                match tokio::time::timeout(timeout, transport.send(&subscription.endpoint, &subscription.keys, &bytes)).await
                {
                    Ok(Ok(())) => {
                        tracing::debug!(endpoint = %subscription.endpoint, "Welcome notification sent");
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(endpoint = %subscription.endpoint, error = %e, "Failed to send welcome notification");
                    }
                    Err(_) => {
                        tracing::warn!(endpoint = %subscription.endpoint, "Welcome notification timed out");
                    }
                }
            }
            .instrument(tracing::debug_span!("welcome_notification")),
        );
    }
}
