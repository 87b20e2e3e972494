use anyhow::{Context, Result};

// ============================================================================
// Configuration Constants
// ============================================================================

const DEFAULT_GATEWAY_PORT: u16 = 8000;
const DEFAULT_AUTH_SERVICE_PORT: u16 = 8002;
const DEFAULT_FEEDBACK_SERVICE_PORT: u16 = 8003;

// Gateway token bucket: burst capacity and steady-state refill per second
const DEFAULT_RATE_LIMIT_BURST: u32 = 20;
const DEFAULT_RATE_LIMIT_PER_SECOND: u32 = 10;

// Deadline for a single forwarded request
const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 30;

// Access token time-to-live
const DEFAULT_TOKEN_TTL_HOURS: i64 = 5;

// ============================================================================
// Configuration Structures
// ============================================================================

/// Gateway process configuration.
///
/// Read once at startup; routing is security relevant and static for the
/// process lifetime, so missing or malformed values are fatal.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub port: u16,
    /// Base URL of the auth backend (owns the /auth-service prefix)
    pub auth_service_url: String,
    /// Base URL of the feedback backend (owns the /feedback-service prefix)
    pub feedback_service_url: String,
    pub rate_limit_burst: u32,
    pub rate_limit_per_second: u32,
    pub proxy_timeout_secs: u64,
    pub rust_log: String,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: env_parse("GATEWAY_PORT", DEFAULT_GATEWAY_PORT)?,
            auth_service_url: env_required("AUTH_SERVICE")?,
            feedback_service_url: env_required("FEEDBACK_SERVICE")?,
            rate_limit_burst: env_parse("RATE_LIMIT_BURST", DEFAULT_RATE_LIMIT_BURST)?,
            rate_limit_per_second: env_parse(
                "RATE_LIMIT_PER_SECOND",
                DEFAULT_RATE_LIMIT_PER_SECOND,
            )?,
            proxy_timeout_secs: env_parse("PROXY_TIMEOUT_SECS", DEFAULT_PROXY_TIMEOUT_SECS)?,
            rust_log: rust_log(),
        };

        if config.rate_limit_burst == 0 || config.rate_limit_per_second == 0 {
            anyhow::bail!("RATE_LIMIT_BURST and RATE_LIMIT_PER_SECOND must be greater than zero");
        }

        Ok(config)
    }
}

/// Seed credentials for the bootstrap admin account.
#[derive(Clone, Debug)]
pub struct AdminSeedConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Auth service process configuration.
#[derive(Clone, Debug)]
pub struct AuthServiceConfig {
    pub port: u16,
    pub database_url: String,
    /// Symmetric signing secret, shared with every service that verifies
    /// tokens. Supplied externally, never compiled in.
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub admin_seed: AdminSeedConfig,
    pub rust_log: String,
}

impl AuthServiceConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env_parse("AUTH_SERVICE_PORT", DEFAULT_AUTH_SERVICE_PORT)?,
            database_url: env_required("DATABASE_URL")?,
            jwt_secret: env_required("JWT_SECRET")?,
            token_ttl_hours: token_ttl_hours()?,
            admin_seed: AdminSeedConfig {
                username: env_required("ADMIN_USERNAME")?,
                email: env_required("ADMIN_EMAIL")?,
                password: env_required("ADMIN_PASSWORD")?,
            },
            rust_log: rust_log(),
        })
    }
}

/// Feedback service process configuration.
#[derive(Clone, Debug)]
pub struct FeedbackServiceConfig {
    pub port: u16,
    pub database_url: String,
    /// Must match the secret the auth service signs with.
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub rust_log: String,
}

impl FeedbackServiceConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env_parse("FEEDBACK_SERVICE_PORT", DEFAULT_FEEDBACK_SERVICE_PORT)?,
            database_url: env_required("DATABASE_URL")?,
            jwt_secret: env_required("JWT_SECRET")?,
            token_ttl_hours: token_ttl_hours()?,
            rust_log: rust_log(),
        })
    }
}

// ============================================================================
// Environment Helpers
// ============================================================================

fn env_required(name: &str) -> Result<String> {
    let value = std::env::var(name)
        .with_context(|| format!("Missing required environment variable {}", name))?;
    if value.trim().is_empty() {
        anyhow::bail!("Environment variable {} must not be empty", name);
    }
    Ok(value)
}

/// Parse an optional environment variable. Absence falls back to the
/// default; a present but malformed value is a startup error.
fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value '{}' for {}: {}", raw, name, e)),
        Err(_) => Ok(default),
    }
}

fn token_ttl_hours() -> Result<i64> {
    let ttl = env_parse("TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
    if ttl <= 0 {
        anyhow::bail!("TOKEN_TTL_HOURS must be greater than zero");
    }
    Ok(ttl)
}

fn rust_log() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}
