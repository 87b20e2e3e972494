// ============================================================================
// Request Identity Extractors
// ============================================================================
//
// The auth middleware chain every protected backend runs:
// - AuthenticatedUser: verifies the bearer token and binds (user id, role)
//   to the request
// - AdminUser: additionally requires the admin role
//
// Both stages are pure computation over the shared AuthManager; nothing is
// looked up server-side.
//
// ============================================================================

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use uuid::Uuid;

use crate::auth::{AuthManager, Role};
use crate::error::AppError;

/// State that can hand out the shared token verifier.
///
/// Implemented by every service context so the extractors below work across
/// backends with a single claims layout and signing secret.
pub trait AuthState: Send + Sync {
    fn auth_manager(&self) -> &AuthManager;
}

/// Verified per-request identity, discarded when the request ends.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: AuthState,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::auth("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth("Invalid Authorization header format"))?;

        let claims = state.auth_manager().verify_token(token).map_err(|e| {
            tracing::warn!(error = %e, "Bearer token verification failed");
            AppError::auth("Invalid or expired token")
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth("Invalid subject in token"))?;

        Ok(AuthenticatedUser {
            user_id,
            role: claims.role,
        })
    }
}

/// Identity that passed the admin role check.
///
/// A role mismatch is reported as 401 to match the deployed contract, even
/// though 403 would describe it better.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: AuthState,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            tracing::warn!(user_id = %user.user_id, "Admin route rejected non-admin token");
            return Err(AppError::auth("Admin role required"));
        }

        Ok(AdminUser(user))
    }
}

/// Json body extractor that reports malformed input as a 400 validation
/// error instead of axum's mixed 415/422 defaults.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        Ok(ValidatedJson(value))
    }
}
