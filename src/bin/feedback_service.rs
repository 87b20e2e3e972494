// ============================================================================
// Feedback Service
// ============================================================================
//
// Feedback CRUD behind bearer-token verification, with admin role gating on
// everything except submission.
//
// ============================================================================

use anyhow::{Context, Result};
use pulse_server::auth::AuthManager;
use pulse_server::config::FeedbackServiceConfig;
use pulse_server::db;
use pulse_server::feedback_service::{self, FeedbackServiceContext};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = FeedbackServiceConfig::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Feedback Service Starting ===");
    info!("Port: {}", config.port);

    let db_pool = db::create_pool(&config.database_url).await?;
    info!("Connected to database");

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("Failed to apply database migrations")?;

    let auth_manager = AuthManager::new(&config.jwt_secret, config.token_ttl_hours)?;

    let ctx = FeedbackServiceContext {
        db_pool: Arc::new(db_pool),
        auth_manager: Arc::new(auth_manager),
    };

    let app = feedback_service::router(ctx);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("Feedback service listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
