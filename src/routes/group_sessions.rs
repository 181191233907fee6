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
        group_sessions::{
            CourseGroupSessionsData, CourseGroupSessionsResponse, CreateTemplateRequest, JoinData,
            JoinGroupSessionRequest, JoinResponse, MaterializeRequest, MaterializeResponse,
            TemplateResponse,
        },
    },
    services::group_session_service::NewTemplate,
};

/// POST /api/v1/tas/{ta_id}/group-sessions
#[instrument(skip(state, request))]
pub async fn create_template(
    State(state): State<AppState>,
    Path(ta_id): Path<Uuid>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<Json<TemplateResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let template = state
        .group_session_service
        .create_template(
            ta_id,
            NewTemplate {
                course_id: request.course_id,
                day_of_week: request.day_of_week,
                start_time: request.start_time,
                end_time: request.end_time,
                capacity: request.capacity,
                price_per_student: request.price_per_student,
            },
        )
        .await?;

    Ok(Json(SuccessResponse::new(template)))
}

/// POST /api/v1/group-sessions/{template_id}/materialize
#[instrument(skip(state, request))]
pub async fn materialize(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
    Json(request): Json<MaterializeRequest>,
) -> Result<Json<MaterializeResponse>> {
    let bookings = state
        .group_session_service
        .materialize_occurrences(template_id, request.weeks_ahead)
        .await?;

    Ok(Json(SuccessResponse::new(bookings)))
}

/// POST /api/v1/group-sessions/{booking_id}/join
#[instrument(skip(state, request))]
pub async fn join(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<JoinGroupSessionRequest>,
) -> Result<Json<JoinResponse>> {
    let result = state
        .group_session_service
        .join_group_session(booking_id, request.student_id)
        .await?;

    Ok(Json(SuccessResponse::new(JoinData::from(result))))
}

/// GET /api/v1/group-sessions/courses/{course_id}
#[instrument(skip(state))]
pub async fn get_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseGroupSessionsResponse>> {
    let sessions = state
        .group_session_service
        .get_group_sessions_by_course(course_id)
        .await?;

    Ok(Json(SuccessResponse::new(
        sessions
            .into_iter()
            .map(CourseGroupSessionsData::from)
            .collect(),
    )))
}
