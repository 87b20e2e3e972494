// Shared helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use pulse_server::auth::AuthManager;
use pulse_server::config::GatewayConfig;
use std::net::SocketAddr;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub address: SocketAddr,
}

/// Bind a router on an ephemeral port and serve it in the background.
pub async fn spawn_router(router: Router) -> TestApp {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    TestApp { address }
}

/// Gateway configuration wired to the given backend addresses.
pub fn gateway_config(
    auth: SocketAddr,
    feedback: SocketAddr,
    burst: u32,
    per_second: u32,
) -> GatewayConfig {
    GatewayConfig {
        port: 0,
        auth_service_url: format!("http://{}", auth),
        feedback_service_url: format!("http://{}", feedback),
        rate_limit_burst: burst,
        rate_limit_per_second: per_second,
        proxy_timeout_secs: 5,
        rust_log: "info".to_string(),
    }
}

/// Token manager sharing the secret used by every spawned test service.
pub fn test_auth_manager() -> AuthManager {
    AuthManager::new(TEST_JWT_SECRET, 5).expect("Failed to build test auth manager")
}
