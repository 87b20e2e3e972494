// ============================================================================
// Gateway Integration Tests
// ============================================================================
//
// Spins up stub backends on ephemeral ports and drives the gateway with a
// real HTTP client:
// - prefix stripping and byte-for-byte passthrough
// - 404 for unrouted prefixes
// - 429 once the token bucket is drained, with no forwarding
// - 502 when the backend is unreachable
// - refusal to start on a malformed route target
//
// ============================================================================

mod test_utils;

use axum::{extract::Request, response::IntoResponse, routing::any, Json, Router};
use pulse_server::config::GatewayConfig;
use pulse_server::gateway;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use test_utils::{gateway_config, spawn_router};

/// Backend stub that counts hits and echoes the request back.
fn echo_router(hits: Arc<AtomicUsize>) -> Router {
    Router::new().fallback(any(move |req: Request| {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);

            let method = req.method().to_string();
            let path = req.uri().path().to_string();
            let query = req.uri().query().unwrap_or_default().to_string();
            let custom_header = req
                .headers()
                .get("x-custom")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = axum::body::to_bytes(req.into_body(), usize::MAX)
                .await
                .expect("Failed to read stub body");

            (
                [("x-backend", "echo")],
                Json(serde_json::json!({
                    "method": method,
                    "path": path,
                    "query": query,
                    "x_custom": custom_header,
                    "body": String::from_utf8_lossy(&body),
                })),
            )
                .into_response()
        }
    }))
}

async fn spawn_gateway(config: &GatewayConfig) -> test_utils::TestApp {
    let router = gateway::router(config).expect("Failed to build gateway router");
    spawn_router(router).await
}

#[tokio::test]
async fn forwards_with_prefix_stripped_and_request_preserved() {
    let hits = Arc::new(AtomicUsize::new(0));
    let auth_backend = spawn_router(echo_router(hits.clone())).await;
    let feedback_backend = spawn_router(echo_router(Arc::new(AtomicUsize::new(0)))).await;

    let config = gateway_config(auth_backend.address, feedback_backend.address, 100, 100);
    let app = spawn_gateway(&config).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/auth-service/login?next=home", app.address))
        .header("x-custom", "value-1")
        .body(r#"{"email":"a@b.c","password":"pw"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers().get("x-backend").unwrap(), "echo");

    let echoed: Value = response.json().await.unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/login");
    assert_eq!(echoed["query"], "next=home");
    assert_eq!(echoed["x_custom"], "value-1");
    assert_eq!(echoed["body"], r#"{"email":"a@b.c","password":"pw"}"#);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn feedback_prefix_routes_to_feedback_backend() {
    let auth_hits = Arc::new(AtomicUsize::new(0));
    let feedback_hits = Arc::new(AtomicUsize::new(0));
    let auth_backend = spawn_router(echo_router(auth_hits.clone())).await;
    let feedback_backend = spawn_router(echo_router(feedback_hits.clone())).await;

    let config = gateway_config(auth_backend.address, feedback_backend.address, 100, 100);
    let app = spawn_gateway(&config).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/feedback-service/feedback", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let echoed: Value = response.json().await.unwrap();
    assert_eq!(echoed["path"], "/feedback");
    assert_eq!(feedback_hits.load(Ordering::SeqCst), 1);
    assert_eq!(auth_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_prefix_is_not_found() {
    let auth_backend = spawn_router(echo_router(Arc::new(AtomicUsize::new(0)))).await;
    let feedback_backend = spawn_router(echo_router(Arc::new(AtomicUsize::new(0)))).await;

    let config = gateway_config(auth_backend.address, feedback_backend.address, 100, 100);
    let app = spawn_gateway(&config).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/metrics-service/stats", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rate_limiter_rejects_excess_and_does_not_forward() {
    let hits = Arc::new(AtomicUsize::new(0));
    let auth_backend = spawn_router(echo_router(hits.clone())).await;
    let feedback_backend = spawn_router(echo_router(Arc::new(AtomicUsize::new(0)))).await;

    // Tiny burst; the refill at 1/s is negligible within this test
    let config = gateway_config(auth_backend.address, feedback_backend.address, 3, 1);
    let app = spawn_gateway(&config).await;

    let client = reqwest::Client::new();
    for _ in 0..3 {
        let response = client
            .get(format!("http://{}/auth-service/ping", app.address))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    let response = client
        .get(format!("http://{}/auth-service/ping", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Too many requests");

    // The rejected request never reached the backend
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn health_endpoint_bypasses_rate_limiting() {
    let auth_backend = spawn_router(echo_router(Arc::new(AtomicUsize::new(0)))).await;
    let feedback_backend = spawn_router(echo_router(Arc::new(AtomicUsize::new(0)))).await;

    let config = gateway_config(auth_backend.address, feedback_backend.address, 1, 1);
    let app = spawn_gateway(&config).await;

    let client = reqwest::Client::new();

    // Drain the bucket
    client
        .get(format!("http://{}/auth-service/ping", app.address))
        .send()
        .await
        .unwrap();

    for _ in 0..5 {
        let response = client
            .get(format!("http://{}/health", app.address))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }
}

#[tokio::test]
async fn unreachable_backend_returns_bad_gateway() {
    // Bind and immediately drop a listener to get a port nobody serves
    let dead_addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let config = gateway_config(dead_addr, dead_addr, 100, 100);
    let app = spawn_gateway(&config).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/auth-service/login", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn malformed_backend_url_refuses_to_start() {
    let config = GatewayConfig {
        port: 0,
        auth_service_url: "not a url".to_string(),
        feedback_service_url: "http://localhost:8003".to_string(),
        rate_limit_burst: 20,
        rate_limit_per_second: 10,
        proxy_timeout_secs: 30,
        rust_log: "info".to_string(),
    };

    assert!(gateway::router(&config).is_err());
}
