//! Web mode against a real listener.

use reqwest::{Client, StatusCode, redirect::Policy};
use serde_json::Value;

use crate::common::{get_free_port, spawn_web, wait_for_listening};

#[tokio::test]
async fn test_status_lists_every_target() {
    let port = get_free_port();
    let _guard = spawn_web(port, &["127.0.0.1", "10.0.0.5-6"]);
    wait_for_listening(port, 10).await;

    let resp = Client::new()
        .get(format!("http://127.0.0.1:{port}/api/status"))
        .send()
        .await
        .expect("failed to query status");
    assert_eq!(resp.status(), StatusCode::OK);

    let json: Value = resp.json().await.expect("status is not JSON");
    let hosts = json.as_object().expect("status is not an object");
    assert_eq!(hosts.len(), 3);
    for ip in ["127.0.0.1", "10.0.0.5", "10.0.0.6"] {
        let record = hosts
            .get(ip)
            .unwrap_or_else(|| panic!("missing {ip} in {json}"));
        assert_eq!(record["IP"], ip);
        assert!(record["Hostname"].is_string());
        assert!(record["Reachable"].is_boolean());
        assert!(record["LastSeen"].is_string());
    }
}

#[tokio::test]
async fn test_dashboard_and_fallback() {
    let port = get_free_port();
    let _guard = spawn_web(port, &["10.0.0.1"]);
    wait_for_listening(port, 10).await;

    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    let resp = client
        .get(format!("http://127.0.0.1:{port}/"))
        .send()
        .await
        .expect("failed to load dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("/api/status"));

    let resp = client
        .get(format!("http://127.0.0.1:{port}/nowhere"))
        .send()
        .await
        .expect("failed to query unknown path");
    assert!(resp.status().is_redirection(), "got {}", resp.status());
    assert_eq!(resp.headers()["location"], "/");
}
