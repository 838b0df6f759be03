use crate::api::AppState;
use crate::api::schemas::subscriptions::{CountResponse, MessageResponse, SubscribeRequest, UnsubscribeRequest};
use crate::domain::notification::NotificationPayload;
use crate::error::{AppError, Result};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Registers or updates a push subscription, then fires a best-effort
/// welcome notification.
///
/// # Errors
/// Returns `AppError::BadRequest` on a malformed payload and
/// `AppError::Database` if the subscription cannot be persisted.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<impl IntoResponse> {
    payload.validate().map_err(AppError::BadRequest)?;

    let subscription = payload.into_subscription();
    let id = state.subscription_service.subscribe(&subscription).await?;
    tracing::info!(id, endpoint = %subscription.endpoint, "Subscription registered");

    let welcome = NotificationPayload::welcome(state.config.delivery.icon.clone());
    state.broadcast_service.send_welcome(subscription, welcome);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse { message: "Subscription registered successfully".to_string() }),
    ))
}

/// Removes a push subscription by endpoint.
///
/// # Errors
/// Returns `AppError::NotFound` if no subscription holds the endpoint and
/// `AppError::Database` if the deletion fails.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<UnsubscribeRequest>,
) -> Result<impl IntoResponse> {
    payload.validate().map_err(AppError::BadRequest)?;

    let removed = state.subscription_service.unsubscribe(&payload.endpoint).await?;
    if removed == 0 {
        return Err(AppError::NotFound("Subscription not found".to_string()));
    }

    tracing::info!(endpoint = %payload.endpoint, "Subscription removed");
    Ok(Json(MessageResponse { message: "Subscription removed".to_string() }))
}

/// Reports how many subscriptions are currently stored.
///
/// # Errors
/// Returns `AppError::Database` if the count query fails.
pub async fn count(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let count = state.subscription_service.count().await?;
    Ok(Json(CountResponse { count }))
}
