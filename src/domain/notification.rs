use serde::Serialize;
use time::OffsetDateTime;

/// JSON payload handed to the push transport. The service worker on the
/// subscriber's device reads these fields to render the notification.
#[derive(Clone, Debug, Serialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl NotificationPayload {
    /// Payload for an operator broadcast, stamped with the current time in
    /// milliseconds.
    #[must_use]
    pub fn broadcast(title: String, body: String, icon: String) -> Self {
        Self { title, body, icon, timestamp: Some(OffsetDateTime::now_utc().unix_timestamp() * 1000) }
    }

    /// Confirmation payload sent right after a successful subscribe.
    #[must_use]
    pub fn welcome(icon: String) -> Self {
        Self {
            title: "Welcome!".to_string(),
            body: "You have successfully subscribed to push notifications.".to_string(),
            icon,
            timestamp: None,
        }
    }
}
