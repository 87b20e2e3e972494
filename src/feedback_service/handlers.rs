// ============================================================================
// Feedback Handlers
// ============================================================================
//
// - POST /feedback: submit feedback (any authenticated identity)
// - GET /feedback: list all feedback (admin)
// - GET /feedback/:id: fetch one entry (admin)
// - GET /feedback/search?q=: filter by sentiment substring (admin)
// - DELETE /feedback/:id: remove one entry (admin)
//
// ============================================================================

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::{self, Feedback};
use crate::error::{AppError, AppResult};
use crate::extract::{AdminUser, AuthenticatedUser, ValidatedJson};

use super::FeedbackServiceContext;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub sentiment: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// POST /feedback
pub async fn submit_feedback(
    State(ctx): State<FeedbackServiceContext>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<FeedbackRequest>,
) -> AppResult<impl IntoResponse> {
    let feedback = db::insert_feedback(
        &ctx.db_pool,
        &user.user_id,
        &request.sentiment,
        &request.message,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to insert feedback");
        AppError::database(e)
    })?;

    tracing::info!(feedback_id = %feedback.id, user_id = %user.user_id, "Feedback submitted");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Feedback submitted successfully" })),
    ))
}

/// GET /feedback
pub async fn list_feedback(
    State(ctx): State<FeedbackServiceContext>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<Feedback>>> {
    let feedbacks = db::list_feedback(&ctx.db_pool).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to query feedbacks");
        AppError::database(e)
    })?;

    Ok(Json(feedbacks))
}

/// GET /feedback/:id
pub async fn get_feedback(
    State(ctx): State<FeedbackServiceContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Feedback>> {
    let feedback = db::get_feedback_by_id(&ctx.db_pool, &id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query feedback");
            AppError::database(e)
        })?
        .ok_or_else(|| AppError::not_found("Feedback not found"))?;

    Ok(Json(feedback))
}

/// GET /feedback/search?q=
pub async fn search_feedback(
    State(ctx): State<FeedbackServiceContext>,
    _admin: AdminUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Feedback>>> {
    let feedbacks = db::search_feedback(&ctx.db_pool, &params.q)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to search feedbacks");
            AppError::database(e)
        })?;

    Ok(Json(feedbacks))
}

/// DELETE /feedback/:id
pub async fn delete_feedback(
    State(ctx): State<FeedbackServiceContext>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let deleted = db::delete_feedback(&ctx.db_pool, &id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to delete feedback");
        AppError::database(e)
    })?;

    if !deleted {
        return Err(AppError::not_found("Feedback not found"));
    }

    tracing::info!(feedback_id = %id, admin_id = %admin.0.user_id, "Feedback deleted");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Feedback deleted successfully" })),
    ))
}
