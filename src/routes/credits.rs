use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    models::{
        common::SuccessResponse,
        credits::{CreditAmountRequest, CreditBalanceResponse, CreditHistoryResponse},
    },
};

/// GET /api/v1/students/{student_id}/credits
#[instrument(skip(state))]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<CreditBalanceResponse>> {
    let balance = state.credits_service.get_balance(student_id).await?;

    Ok(Json(SuccessResponse::new(balance.into())))
}

/// POST /api/v1/students/{student_id}/credits/add
#[instrument(skip(state, request))]
pub async fn add_credits(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(request): Json<CreditAmountRequest>,
) -> Result<Json<CreditBalanceResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let reason = request
        .reason
        .as_deref()
        .unwrap_or("Credits added to account");
    let balance = state
        .credits_service
        .add_credits(student_id, request.amount, reason)
        .await?;

    Ok(Json(SuccessResponse::new(balance.into())))
}

/// POST /api/v1/students/{student_id}/credits/use
#[instrument(skip(state, request))]
pub async fn use_credits(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(request): Json<CreditAmountRequest>,
) -> Result<Json<CreditBalanceResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let reason = request
        .reason
        .as_deref()
        .unwrap_or("Credits used for booking");
    let balance = state
        .credits_service
        .use_credits(student_id, request.amount, reason)
        .await?;

    Ok(Json(SuccessResponse::new(balance.into())))
}

/// POST /api/v1/students/{student_id}/credits/refund
#[instrument(skip(state, request))]
pub async fn refund_credits(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(request): Json<CreditAmountRequest>,
) -> Result<Json<CreditBalanceResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let reason = request.reason.as_deref().unwrap_or("Credits refunded");
    let balance = state
        .credits_service
        .refund_credits(student_id, request.amount, reason)
        .await?;

    Ok(Json(SuccessResponse::new(balance.into())))
}

/// GET /api/v1/students/{student_id}/credits/history
#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<CreditHistoryResponse>> {
    let history = state.credits_service.get_history(student_id).await?;

    Ok(Json(SuccessResponse::new(history)))
}
