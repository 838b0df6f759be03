use serde::{Deserialize, Serialize};

/// Query string of `GET /send-notification`. Both fields are optional and
/// fall back to stock text.
#[derive(Debug, Deserialize)]
pub struct SendNotificationParams {
    pub title: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    pub message: String,
    pub subscribers: i64,
}
