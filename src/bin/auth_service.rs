// ============================================================================
// Auth Service
// ============================================================================
//
// Registration, credential verification and signed token issuance. Seeds the
// bootstrap admin account on first start.
//
// ============================================================================

use anyhow::{Context, Result};
use pulse_server::auth::AuthManager;
use pulse_server::auth_service::{self, AuthServiceContext};
use pulse_server::config::AuthServiceConfig;
use pulse_server::db;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AuthServiceConfig::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Auth Service Starting ===");
    info!("Port: {}", config.port);

    let db_pool = db::create_pool(&config.database_url).await?;
    info!("Connected to database");

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("Failed to apply database migrations")?;

    db::seed_admin(
        &db_pool,
        &config.admin_seed.username,
        &config.admin_seed.email,
        &config.admin_seed.password,
    )
    .await?;

    let auth_manager = AuthManager::new(&config.jwt_secret, config.token_ttl_hours)?;

    let ctx = AuthServiceContext {
        db_pool: Arc::new(db_pool),
        auth_manager: Arc::new(auth_manager),
    };

    let app = auth_service::router(ctx);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("Auth service listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
