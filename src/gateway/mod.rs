// ============================================================================
// API Gateway
// ============================================================================
//
// Single entry point for all client traffic:
// - Token-bucket rate limiting across every proxied route
// - Prefix-based request forwarding to the owning backend
//
// The gateway performs no authentication itself; identity is verified inside
// each backend so the services stay independently callable.
//
// ============================================================================

pub mod proxy;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::error::{AppError, AppResult};
use crate::rate_limit::TokenBucket;
use proxy::{ProxyClient, RouteTable};

/// Shared gateway state, owned by the server and injected into handlers.
pub struct GatewayState {
    pub table: RouteTable,
    pub proxy: ProxyClient,
    pub limiter: TokenBucket,
}

impl GatewayState {
    pub fn from_config(config: &GatewayConfig) -> AppResult<Self> {
        Ok(Self {
            table: RouteTable::from_config(config)?,
            proxy: ProxyClient::new(Duration::from_secs(config.proxy_timeout_secs))?,
            limiter: TokenBucket::new(config.rate_limit_burst, config.rate_limit_per_second),
        })
    }
}

/// Build the gateway router. Fails if the routing configuration is unusable;
/// the process must refuse to start rather than serve a broken route table.
pub fn router(config: &GatewayConfig) -> AppResult<Router> {
    let state = Arc::new(GatewayState::from_config(config)?);

    Ok(Router::new()
        .route("/health", get(health_check))
        .fallback(forward_request)
        // Admission control runs before any routing or forwarding work
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(state.clone(), rate_limiting))
                .into_inner(),
        )
        .with_state(state))
}

async fn health_check() -> &'static str {
    "ok"
}

/// Admission control. Runs before routing so a rejected request does no
/// further work; the health endpoint stays reachable for probes.
async fn rate_limiting(
    State(state): State<Arc<GatewayState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.uri().path() == "/health" {
        return Ok(next.run(req).await);
    }

    if !state.limiter.allow() {
        tracing::warn!(path = %req.uri().path(), "Rate limit exceeded, rejecting request");
        return Err(AppError::TooManyRequests("Too many requests".to_string()));
    }

    Ok(next.run(req).await)
}

/// Dispatch a request to the backend owning its path prefix.
async fn forward_request(
    State(state): State<Arc<GatewayState>>,
    request: Request<Body>,
) -> AppResult<Response<Body>> {
    let path = request.uri().path().to_string();

    let Some((rule, rewritten)) = state.table.resolve(&path) else {
        return Err(AppError::not_found(format!("No route for path {}", path)));
    };

    tracing::debug!(
        prefix = rule.prefix(),
        rewritten = %rewritten,
        "Forwarding request"
    );

    state.proxy.forward(rule, &rewritten, request).await
}
