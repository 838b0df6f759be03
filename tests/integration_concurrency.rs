mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_concurrent_subscribe_unsubscribe_converges() {
    let app = TestApp::spawn().await;
    let endpoint = "https://push.example.com/contested";

    let mut handles = Vec::new();
    for i in 0..10 {
        let client = app.client.clone();
        let url = app.server_url.clone();
        if i % 2 == 0 {
            handles.push(tokio::spawn(async move {
                let _ = client
                    .post(format!("{url}/subscribe"))
                    .json(&json!({
                        "endpoint": endpoint,
                        "keys": { "p256dh": format!("key_{i}"), "auth": "auth_secret" }
                    }))
                    .send()
                    .await;
            }));
        } else {
            handles.push(tokio::spawn(async move {
                let _ = client
                    .post(format!("{url}/unsubscribe"))
                    .json(&json!({ "endpoint": endpoint }))
                    .send()
                    .await;
            }));
        }
    }
    for handle in handles {
        handle.await.expect("task");
    }

    // Whatever the interleaving, the endpoint ends up either absent or
    // present exactly once with complete key material. Never torn.
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT p256dh, auth FROM subscriptions WHERE endpoint = $1")
            .bind(endpoint)
            .fetch_all(&app.pool)
            .await
            .expect("rows");

    assert!(rows.len() <= 1, "the endpoint must never be stored twice");
    if let Some((p256dh, auth)) = rows.first() {
        assert!(p256dh.starts_with("key_"), "stored record must be one of the written states");
        assert_eq!(auth, "auth_secret");
    }
}

#[tokio::test]
async fn test_concurrent_distinct_subscribes_all_land() {
    let app = TestApp::spawn().await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let client = app.client.clone();
        let url = app.server_url.clone();
        handles.push(tokio::spawn(async move {
            let resp = client
                .post(format!("{url}/subscribe"))
                .json(&json!({
                    "endpoint": format!("https://push.example.com/{i}"),
                    "keys": { "p256dh": "pk", "auth": "as" }
                }))
                .send()
                .await
                .expect("subscribe");
            assert_eq!(resp.status(), 201);
        }));
    }
    for handle in handles {
        handle.await.expect("task");
    }

    assert_eq!(app.stored_count().await, 20);
}
