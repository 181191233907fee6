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
        availability::{
            CreateAvailabilityRequest, SlotListResponse, SlotRemovalData, SlotRemovalResponse,
            SlotResponse, UpdateAvailabilityRequest,
        },
        common::SuccessResponse,
    },
    services::availability_service::{SlotChanges, SlotRemoval},
};

/// POST /api/v1/tas/{ta_id}/availability
#[instrument(skip(state, request))]
pub async fn create_availability(
    State(state): State<AppState>,
    Path(ta_id): Path<Uuid>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<Json<SlotResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let slot = state
        .availability_service
        .create_availability(
            ta_id,
            request.course_id,
            &request.date,
            &request.start_time,
            &request.end_time,
            request.capacity,
        )
        .await?;

    Ok(Json(SuccessResponse::new(slot)))
}

/// GET /api/v1/tas/{ta_id}/availability
#[instrument(skip(state))]
pub async fn get_ta_availability(
    State(state): State<AppState>,
    Path(ta_id): Path<Uuid>,
) -> Result<Json<SlotListResponse>> {
    let slots = state.availability_service.get_availability_by_ta(ta_id).await?;

    Ok(Json(SuccessResponse::new(slots)))
}

/// GET /api/v1/courses/{course_id}/availability
#[instrument(skip(state))]
pub async fn get_course_availability(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<SlotListResponse>> {
    let slots = state
        .availability_service
        .get_availability_for_course(course_id)
        .await?;

    Ok(Json(SuccessResponse::new(slots)))
}

/// PATCH /api/v1/tas/{ta_id}/availability/{slot_id}
#[instrument(skip(state, request))]
pub async fn update_availability(
    State(state): State<AppState>,
    Path((ta_id, slot_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<SlotResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let slot = state
        .availability_service
        .update_availability(
            ta_id,
            slot_id,
            SlotChanges {
                start_time: request.start_time,
                end_time: request.end_time,
                capacity: request.capacity,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(Json(SuccessResponse::new(slot)))
}

/// DELETE /api/v1/tas/{ta_id}/availability/{slot_id}
#[instrument(skip(state))]
pub async fn delete_availability(
    State(state): State<AppState>,
    Path((ta_id, slot_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SlotRemovalResponse>> {
    let removal = state
        .availability_service
        .delete_availability(ta_id, slot_id)
        .await?;

    Ok(Json(SuccessResponse::new(SlotRemovalData {
        deleted: removal == SlotRemoval::Deleted,
    })))
}
