// ============================================================================
// Feedback Service
// ============================================================================
//
// Token-verified feedback CRUD behind the gateway's /feedback-service prefix.
// Submission is open to any authenticated identity; listing, lookup, search
// and deletion require the admin role.
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
use crate::extract::AuthState;

/// Feedback service context, injected into handlers through router state.
#[derive(Clone)]
pub struct FeedbackServiceContext {
    pub db_pool: Arc<DbPool>,
    pub auth_manager: Arc<AuthManager>,
}

impl AuthState for FeedbackServiceContext {
    fn auth_manager(&self) -> &AuthManager {
        &self.auth_manager
    }
}

pub fn router(ctx: FeedbackServiceContext) -> Router {
    Router::new()
        .route(
            "/feedback",
            post(handlers::submit_feedback).get(handlers::list_feedback),
        )
        .route("/feedback/search", get(handlers::search_feedback))
        .route(
            "/feedback/:id",
            get(handlers::get_feedback).delete(handlers::delete_feedback),
        )
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> &'static str {
    "ok"
}
