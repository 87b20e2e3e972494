// ============================================================================
// Auth Service
// ============================================================================
//
// Issues identity: registration, credential verification and signed token
// creation. Runs behind the gateway under the /auth-service prefix.
//
// ============================================================================

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::AuthManager;
use crate::db::DbPool;

/// Auth service context, injected into handlers through router state.
#[derive(Clone)]
pub struct AuthServiceContext {
    pub db_pool: Arc<DbPool>,
    pub auth_manager: Arc<AuthManager>,
}

pub fn router(ctx: AuthServiceContext) -> Router {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> &'static str {
    "ok"
}
