// ============================================================================
// Auth Handlers
// ============================================================================
//
// - POST /register: create a user account with a bcrypt password hash
// - POST /login: verify credentials and issue a signed token
//
// Login failure never reveals whether the email exists or the password was
// wrong.
//
// ============================================================================

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Role;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;

use super::AuthServiceContext;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /register
pub async fn register(
    State(ctx): State<AuthServiceContext>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(AppError::validation(
            "username, email and password must not be empty",
        ));
    }

    // New accounts always start as plain users; the only admin is seeded
    let user = db::create_user(
        &ctx.db_pool,
        &request.username,
        &request.email,
        &request.password,
        Role::User,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to insert user");
        AppError::database(e)
    })?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// POST /login
pub async fn login(
    State(ctx): State<AuthServiceContext>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = db::get_user_by_email(&ctx.db_pool, &request.email)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to look up user");
            AppError::database(e)
        })?
        .ok_or(AppError::InvalidCredentials)?;

    if !db::verify_password(&user, &request.password)
        .await
        .unwrap_or(false)
    {
        tracing::warn!("Invalid password attempt");
        return Err(AppError::InvalidCredentials);
    }

    let role: Role = user.role.parse().map_err(|e| {
        tracing::error!(error = %e, user_id = %user.id, "Stored role is not valid");
        AppError::internal("Login failed")
    })?;

    let (token, _expires_at) = ctx.auth_manager.create_token(&user.id, role).map_err(|e| {
        tracing::error!(error = %e, "Failed to create token");
        AppError::internal("Unable to generate token")
    })?;

    tracing::info!(user_id = %user.id, "Login successful");

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Login successful",
            "user_id": user.id,
            "role": role,
            "token": token,
        })),
    ))
}
