#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use farol_server::config::Config;
use farol_server::services::broadcast_service::BroadcastService;
use farol_server::services::push::web_push::WebPushTransport;
use farol_server::services::subscription_service::SubscriptionService;
use farol_server::storage::subscription_repo::SubscriptionRepository;
use farol_server::{api, storage, telemetry};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    telemetry::init_telemetry(config.log_format);

    // Fatal at boot: broken key material would otherwise surface as a
    // failure on every delivery attempt.
    config.vapid.validate()?;

    let boot_span = tracing::info_span!("boot_server");
    let (listener, app_router, shutdown_tx, shutdown_rx) = async {
        // Phase 1: Infrastructure Setup (Resources)
        let pool = storage::init_pool(&config.database_url).await?;
        storage::run_migrations(&pool).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        farol_server::spawn_signal_handler(shutdown_tx.clone());

        // Phase 2: Component Wiring (Pure logic, no side effects)
        let repo = SubscriptionRepository::new();
        let transport = Arc::new(WebPushTransport::new(&config.vapid, &config.delivery));
        let subscription_service = SubscriptionService::new(pool.clone(), repo.clone());
        let broadcast_service =
            BroadcastService::new(pool, repo, transport, Duration::from_secs(config.delivery.timeout_secs));

        // Phase 3: Runtime Setup (Listener and Router)
        let app_router = api::app_router(config.clone(), subscription_service, broadcast_service);

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        tracing::info!(address = %addr, "listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;

        Ok::<(tokio::net::TcpListener, axum::Router, watch::Sender<bool>, watch::Receiver<bool>), anyhow::Error>((
            listener,
            app_router,
            shutdown_tx,
            shutdown_rx,
        ))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Serve until a shutdown signal arrives
    let mut serve_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app_router).with_graceful_shutdown(async move {
        let _ = serve_rx.wait_for(|&s| s).await;
    });

    if let Err(e) = server.await {
        tracing::error!(error = %e, "Server error");
    }

    let _ = shutdown_tx.send(true);
    tracing::info!("Server shut down");
    Ok(())
}
