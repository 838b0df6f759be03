use crate::api::AppState;
use crate::api::schemas::notifications::{SendNotificationParams, SendNotificationResponse};
use crate::domain::notification::NotificationPayload;
use crate::error::Result;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

const DEFAULT_TITLE: &str = "Push Notification";
const DEFAULT_BODY: &str = "New notification!";

/// Serves the VAPID public key the browser needs for
/// `pushManager.subscribe`.
pub async fn vapid_public_key(State(state): State<AppState>) -> impl IntoResponse {
    state.config.vapid.public_key.clone()
}

/// Broadcasts a notification to every subscriber, prunes endpoints the push
/// service rejected permanently, and reports the surviving subscriber count.
///
/// # Errors
/// Returns `AppError::Database` if the subscriber snapshot, pruning or
/// recount fails. Per-recipient delivery failures are reflected in the
/// counts, not as errors.
pub async fn send_notification(
    State(state): State<AppState>,
    Query(params): Query<SendNotificationParams>,
) -> Result<Response> {
    let payload = NotificationPayload::broadcast(
        params.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        params.message.unwrap_or_else(|| DEFAULT_BODY.to_string()),
        state.config.delivery.icon.clone(),
    );

    let Some(result) = state.broadcast_service.broadcast_to_all(&payload).await? else {
        return Ok((StatusCode::NOT_FOUND, Json(json!({ "message": "No subscriptions found" }))).into_response());
    };

    tracing::info!(
        attempted = result.attempted,
        delivered = result.delivered,
        retired = result.retired.len(),
        subscribers = result.remaining,
        "Broadcast completed"
    );

    Ok((
        StatusCode::OK,
        Json(SendNotificationResponse {
            message: "Notifications sent successfully".to_string(),
            subscribers: result.remaining,
        }),
    )
        .into_response())
}
