use crate::config::Config;
use crate::services::broadcast_service::BroadcastService;
use crate::services::subscription_service::SubscriptionService;
use axum::body::Body;
use axum::http::Request;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod middleware;
pub mod notifications;
pub mod schemas;
pub mod subscriptions;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub subscription_service: SubscriptionService,
    pub broadcast_service: BroadcastService,
}

/// Configures and returns the application router.
pub fn app_router(
    config: Config,
    subscription_service: SubscriptionService,
    broadcast_service: BroadcastService,
) -> Router {
    let state = AppState { config, subscription_service, broadcast_service };

    Router::new()
        .route("/vapidPublicKey", get(notifications::vapid_public_key))
        .route("/subscribe", post(subscriptions::subscribe))
        .route("/unsubscribe", post(subscriptions::unsubscribe))
        .route("/send-notification", get(notifications::send_notification))
        .route("/subscriptions", get(subscriptions::count))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuidOrHeader,
        ))
        .with_state(state)
}
