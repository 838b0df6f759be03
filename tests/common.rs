use async_trait::async_trait;
use farol_server::api;
use farol_server::config::{Config, DeliveryConfig, LogFormat, ServerConfig, VapidConfig};
use farol_server::domain::subscription::SubscriptionKeys;
use farol_server::services::broadcast_service::BroadcastService;
use farol_server::services::push::transport::{PushTransport, TransportError};
use farol_server::services::subscription_service::SubscriptionService;
use farol_server::storage::subscription_repo::SubscriptionRepository;
use farol_server::storage::{self, DbPool};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("farol_server=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

#[allow(dead_code)]
pub fn get_test_config(database_url: String) -> Config {
    Config {
        database_url,
        log_format: LogFormat::Text,
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0 },
        vapid: VapidConfig {
            public_key: "test_public_key".to_string(),
            private_key: "test_private_key".to_string(),
            subject: "mailto:test@example.com".to_string(),
        },
        delivery: DeliveryConfig { timeout_secs: 2, ttl_secs: 60, icon: "/badge.svg".to_string() },
    }
}

/// Transport with scripted outcomes per endpoint: endpoints in `gone` report
/// permanently gone, endpoints in `failing` report a transient error,
/// everything else succeeds. Every attempt is recorded.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub gone: HashSet<String>,
    pub failing: HashSet<String>,
    sent: Mutex<Vec<(String, Vec<u8>)>>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn with_gone(endpoints: &[&str]) -> Self {
        Self { gone: endpoints.iter().map(ToString::to_string).collect(), ..Self::default() }
    }

    pub fn with_failing(endpoints: &[&str]) -> Self {
        Self { failing: endpoints.iter().map(ToString::to_string).collect(), ..Self::default() }
    }

    /// Endpoints of every recorded attempt, in settlement order.
    pub fn attempts(&self) -> Vec<String> {
        self.sent.lock().expect("transport lock").iter().map(|(endpoint, _)| endpoint.clone()).collect()
    }

    /// Every payload attempted for an endpoint, in settlement order. The
    /// detached welcome send races the broadcast, so callers match on
    /// content rather than position.
    pub fn payloads_for(&self, endpoint: &str) -> Vec<serde_json::Value> {
        self.sent
            .lock()
            .expect("transport lock")
            .iter()
            .filter(|(e, _)| e == endpoint)
            .filter_map(|(_, payload)| serde_json::from_slice(payload).ok())
            .collect()
    }
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn send(&self, endpoint: &str, _keys: &SubscriptionKeys, payload: &[u8]) -> Result<(), TransportError> {
        self.sent.lock().expect("transport lock").push((endpoint.to_string(), payload.to_vec()));

        if self.gone.contains(endpoint) {
            return Err(TransportError::Gone);
        }
        if self.failing.contains(endpoint) {
            return Err(TransportError::Other(anyhow::anyhow!("connection reset")));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub server_url: String,
    pub client: reqwest::Client,
    pub pool: DbPool,
    pub transport: Arc<RecordingTransport>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(RecordingTransport::default()).await
    }

    pub async fn spawn_with(transport: RecordingTransport) -> Self {
        setup_tracing();

        let db_path = std::env::temp_dir().join(format!("farol-test-{}.sqlite", uuid::Uuid::new_v4()));
        let config = get_test_config(format!("sqlite://{}", db_path.display()));

        let pool = storage::init_pool(&config.database_url).await.expect("Failed to open test database");
        storage::run_migrations(&pool).await.expect("Failed to run migrations");

        let transport = Arc::new(transport);
        let repo = SubscriptionRepository::new();
        let subscription_service = SubscriptionService::new(pool.clone(), repo.clone());
        let broadcast_service = BroadcastService::new(
            pool.clone(),
            repo,
            Arc::clone(&transport) as Arc<dyn PushTransport>,
            Duration::from_secs(config.delivery.timeout_secs),
        );

        let router = api::app_router(config, subscription_service, broadcast_service);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener address");

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "Test server error");
            }
        });

        Self { server_url: format!("http://{addr}"), client: reqwest::Client::new(), pool, transport }
    }

    pub async fn subscribe(&self, endpoint: &str) -> reqwest::Response {
        self.subscribe_with_key(endpoint, "p256dh_key").await
    }

    pub async fn subscribe_with_key(&self, endpoint: &str, p256dh: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/subscribe", self.server_url))
            .json(&serde_json::json!({
                "endpoint": endpoint,
                "keys": { "p256dh": p256dh, "auth": "auth_secret" }
            }))
            .send()
            .await
            .expect("subscribe request")
    }

    pub async fn stored_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(&self.pool)
            .await
            .expect("count query")
    }
}
