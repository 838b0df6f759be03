use crate::domain::subscription::SubscriptionKeys;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Endpoint is permanently gone")]
    Gone,
    #[error("Delivery failed: {0}")]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait PushTransport: Send + Sync + std::fmt::Debug {
    /// Makes one delivery attempt to a subscriber's push endpoint.
    ///
    /// # Errors
    /// Returns `TransportError::Gone` if the push service reports the
    /// endpoint permanently invalid and the subscription should be retired.
    async fn send(&self, endpoint: &str, keys: &SubscriptionKeys, payload: &[u8]) -> Result<(), TransportError>;
}
