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
        bundles::{BundleListResponse, BundleResponse, PurchaseBundleRequest},
        common::SuccessResponse,
    },
    services::bundle_service::NewBundlePurchase,
};

/// POST /api/v1/bundles
#[instrument(skip(state, request))]
pub async fn purchase_bundle(
    State(state): State<AppState>,
    Json(request): Json<PurchaseBundleRequest>,
) -> Result<Json<BundleResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let purchase = state
        .bundle_service
        .purchase_bundle(NewBundlePurchase {
            student_id: request.student_id,
            course_id: request.course_id,
            product_id: request.product_id,
            coverage_type: request.coverage_type,
            total_sessions: request.total_sessions,
            valid_from: request.valid_from,
            valid_to: request.valid_to,
        })
        .await?;

    Ok(Json(SuccessResponse::new(purchase)))
}

/// GET /api/v1/students/{student_id}/bundles
#[instrument(skip(state))]
pub async fn get_student_bundles(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<BundleListResponse>> {
    let bundles = state.bundle_service.get_student_bundles(student_id).await?;

    Ok(Json(SuccessResponse::new(bundles)))
}

/// GET /api/v1/students/{student_id}/courses/{course_id}/bundles/active
#[instrument(skip(state))]
pub async fn get_active_bundles(
    State(state): State<AppState>,
    Path((student_id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BundleListResponse>> {
    let bundles = state
        .bundle_service
        .get_active_bundles(student_id, course_id)
        .await?;

    Ok(Json(SuccessResponse::new(bundles)))
}
