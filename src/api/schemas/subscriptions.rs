use crate::domain::subscription::{NewSubscription, SubscriptionKeys};
use serde::{Deserialize, Serialize};

const MAX_ENDPOINT_LEN: usize = 2048;
const MAX_KEY_LEN: usize = 512;

/// Body of `POST /subscribe`: the browser's `PushSubscription` JSON.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub endpoint: String,
    pub keys: SubscriptionKeysRequest,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionKeysRequest {
    pub p256dh: String,
    pub auth: String,
}

impl SubscribeRequest {
    /// Validates the subscription payload.
    ///
    /// # Errors
    /// Returns an error if the endpoint or key material is empty or
    /// excessively large (anti-abuse).
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("Endpoint cannot be empty".into());
        }
        if self.endpoint.len() > MAX_ENDPOINT_LEN {
            return Err(format!("Endpoint is too long (max {MAX_ENDPOINT_LEN} characters)"));
        }
        for (name, value) in [("p256dh", &self.keys.p256dh), ("auth", &self.keys.auth)] {
            if value.trim().is_empty() {
                return Err(format!("Key '{name}' cannot be empty"));
            }
            if value.len() > MAX_KEY_LEN {
                return Err(format!("Key '{name}' is too long (max {MAX_KEY_LEN} characters)"));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn into_subscription(self) -> NewSubscription {
        NewSubscription {
            endpoint: self.endpoint,
            keys: SubscriptionKeys { p256dh: self.keys.p256dh, auth: self.keys.auth },
        }
    }
}

/// Body of `POST /unsubscribe`.
#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

impl UnsubscribeRequest {
    /// Validates the unsubscribe payload.
    ///
    /// # Errors
    /// Returns an error if the endpoint is empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("Endpoint cannot be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}
