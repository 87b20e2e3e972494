// ============================================================================
// API Gateway Service
// ============================================================================
//
// Single entry point for all client requests:
// - Token-bucket rate limiting (burst and refill are configurable)
// - Prefix-based forwarding to the auth and feedback backends
//
// Stateless apart from the rate limiter; routing is fixed for the lifetime
// of the process, so a broken route table prevents startup.
//
// ============================================================================

use anyhow::{Context, Result};
use pulse_server::config::GatewayConfig;
use pulse_server::gateway;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== API Gateway Starting ===");
    info!("Port: {}", config.port);
    info!("Auth service: {}", config.auth_service_url);
    info!("Feedback service: {}", config.feedback_service_url);
    info!(
        "Rate limit: burst {} / {} per second",
        config.rate_limit_burst, config.rate_limit_per_second
    );

    let app = gateway::router(&config).context("Failed to build gateway router")?;

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("API Gateway listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
