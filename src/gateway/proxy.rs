// ============================================================================
// Reverse-Proxy Dispatcher
// ============================================================================
//
// Forwards inbound requests to the backend owning their path prefix:
// - Static route table built once at startup; a malformed target URL is a
//   fatal configuration error
// - The matched prefix is stripped; method, headers, query string and body
//   pass through unchanged
// - The backend response is streamed back unmodified, including chunked
//   bodies
// - One attempt per request with a fixed deadline, no retries, so
//   non-idempotent calls are delivered at most once
//
// ============================================================================

use axum::body::Body;
use axum::http::{Request, Response};
use std::time::Duration;
use url::Url;

use crate::config::GatewayConfig;
use crate::error::{AppError, AppResult};

/// Immutable routing rule: requests under `prefix` go to `target`.
#[derive(Debug, Clone)]
pub struct RouteRule {
    prefix: String,
    target: Url,
}

impl RouteRule {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn target_for(&self, rewritten_path: &str, query: Option<&str>) -> String {
        let base = self.target.as_str().trim_end_matches('/');
        match query {
            Some(q) => format!("{}{}?{}", base, rewritten_path, q),
            None => format!("{}{}", base, rewritten_path),
        }
    }
}

/// Fixed prefix -> backend mapping, built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn from_config(config: &GatewayConfig) -> AppResult<Self> {
        Self::new(vec![
            ("/auth-service", config.auth_service_url.as_str()),
            ("/feedback-service", config.feedback_service_url.as_str()),
        ])
    }

    /// Build a table from (prefix, target) pairs. A target that does not
    /// parse as an absolute http(s) URL refuses to start the process rather
    /// than serve a broken route.
    pub fn new(routes: Vec<(&str, &str)>) -> AppResult<Self> {
        let mut rules = Vec::with_capacity(routes.len());

        for (prefix, target) in routes {
            let url = Url::parse(target).map_err(|e| {
                AppError::Config(format!("Invalid backend URL '{}': {}", target, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(AppError::Config(format!(
                    "Backend URL '{}' must use http or https",
                    target
                )));
            }
            rules.push(RouteRule {
                prefix: prefix.to_string(),
                target: url,
            });
        }

        Ok(Self { rules })
    }

    /// Match `path` against the configured prefixes at a segment boundary
    /// and return the owning rule plus the path with the prefix removed.
    pub fn resolve(&self, path: &str) -> Option<(&RouteRule, String)> {
        self.rules
            .iter()
            .find_map(|rule| strip_route_prefix(path, &rule.prefix).map(|rest| (rule, rest)))
    }
}

// "/auth-service" and "/auth-service/..." match; "/auth-servicex" must not.
fn strip_route_prefix(path: &str, prefix: &str) -> Option<String> {
    let rest = path.strip_prefix(prefix)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    Some(if rest.is_empty() {
        "/".to_string()
    } else {
        rest.to_string()
    })
}

/// HTTP client that forwards a request to one backend and streams the
/// response back.
pub struct ProxyClient {
    client: reqwest::Client,
}

impl ProxyClient {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build proxy HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Forward a request to the backend named by `rule` with the prefix
    /// already stripped from `rewritten_path`.
    pub async fn forward(
        &self,
        rule: &RouteRule,
        rewritten_path: &str,
        request: Request<Body>,
    ) -> AppResult<Response<Body>> {
        let method = request.method().clone();
        let headers = request.headers().clone();
        let query = request.uri().query().map(str::to_owned);
        let target_url = rule.target_for(rewritten_path, query.as_deref());

        let (_parts, body) = request.into_parts();
        let body_bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read request body: {}", e)))?;

        let mut upstream_request = self.client.request(method, &target_url);

        for (key, value) in headers.iter() {
            // reqwest derives Host from the target URL
            if key != "host" {
                upstream_request = upstream_request.header(key, value);
            }
        }

        if !body_bytes.is_empty() {
            upstream_request = upstream_request.body(body_bytes);
        }

        let upstream_response = upstream_request.send().await.map_err(|e| {
            tracing::error!(target = %target_url, error = %e, "Forwarding to backend failed");
            AppError::Upstream(e.to_string())
        })?;

        let mut response = Response::builder().status(upstream_response.status());

        for (key, value) in upstream_response.headers().iter() {
            // hyper re-frames the streamed body itself
            if key == "transfer-encoding" || key == "connection" {
                continue;
            }
            response = response.header(key, value);
        }

        response
            .body(Body::from_stream(upstream_response.bytes_stream()))
            .map_err(|e| AppError::Internal(format!("Failed to build proxied response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::new(vec![
            ("/auth-service", "http://localhost:8002"),
            ("/feedback-service", "http://localhost:8003"),
        ])
        .unwrap()
    }

    #[test]
    fn resolves_prefix_and_strips_it() {
        let table = table();

        let (rule, rest) = table.resolve("/auth-service/login").unwrap();
        assert_eq!(rule.prefix(), "/auth-service");
        assert_eq!(rest, "/login");

        let (rule, rest) = table.resolve("/feedback-service/feedback/abc").unwrap();
        assert_eq!(rule.prefix(), "/feedback-service");
        assert_eq!(rest, "/feedback/abc");
    }

    #[test]
    fn bare_prefix_rewrites_to_root() {
        let table = table();
        let (_, rest) = table.resolve("/auth-service").unwrap();
        assert_eq!(rest, "/");
        let (_, rest) = table.resolve("/auth-service/").unwrap();
        assert_eq!(rest, "/");
    }

    #[test]
    fn prefix_matches_only_at_segment_boundary() {
        let table = table();
        assert!(table.resolve("/auth-services/login").is_none());
        assert!(table.resolve("/auth-servicex").is_none());
    }

    #[test]
    fn unknown_path_has_no_route() {
        let table = table();
        assert!(table.resolve("/metrics").is_none());
        assert!(table.resolve("/").is_none());
    }

    #[test]
    fn malformed_target_url_is_a_config_error() {
        let result = RouteTable::new(vec![("/auth-service", "not a url")]);
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = RouteTable::new(vec![("/auth-service", "ftp://example.com")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn target_url_preserves_query_string() {
        let table = table();
        let (rule, rest) = table.resolve("/feedback-service/feedback/search").unwrap();
        assert_eq!(
            rule.target_for(&rest, Some("q=happy")),
            "http://localhost:8003/feedback/search?q=happy"
        );
        assert_eq!(
            rule.target_for(&rest, None),
            "http://localhost:8003/feedback/search"
        );
    }
}
