use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role carried in every token.
///
/// Never inferred: issued from the stored user row at login and checked
/// explicitly on admin routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => anyhow::bail!("Unknown role: {}", other),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub role: Role,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration time
}

/// Signs and verifies identity tokens.
///
/// One instance per process, built from configuration. Both operations are
/// pure computation over the shared HS256 secret; nothing is stored
/// server-side, so a token's validity is entirely its signature and embedded
/// expiry.
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_hours: i64,
}

impl AuthManager {
    pub fn new(secret: &str, token_ttl_hours: i64) -> Result<Self> {
        if secret.trim().is_empty() {
            anyhow::bail!("JWT signing secret must not be empty");
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_hours,
        })
    }

    /// Create a signed token for a verified identity.
    /// Returns the opaque token string and its expiry timestamp.
    pub fn create_token(&self, user_id: &Uuid, role: Role) -> Result<(String, i64)> {
        self.create_token_at(user_id, role, Utc::now())
    }

    // Issuance time is a parameter so expiry behavior is testable without
    // sleeping through the TTL.
    fn create_token_at(
        &self,
        user_id: &Uuid,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<(String, i64)> {
        let exp = issued_at + Duration::hours(self.token_ttl_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to encode JWT token")?;

        Ok((token, exp.timestamp()))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is accepted only while now < exp
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Token verification failed")?;

        Ok(token_data.claims)
    }
}
