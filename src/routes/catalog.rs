use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    error::Result,
    models::{
        catalog::{
            CourseListResponse, CourseResponse, CourseSupportOptionsData,
            CourseSupportOptionsResponse, SupportOptionsQuery, TaListResponse,
        },
        common::SuccessResponse,
    },
};

/// GET /api/v1/courses
#[instrument(skip(state))]
pub async fn list_courses(State(state): State<AppState>) -> Result<Json<CourseListResponse>> {
    let courses = state.catalog_service.list_courses().await?;

    Ok(Json(SuccessResponse::new(courses)))
}

/// GET /api/v1/courses/{course_id}
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseResponse>> {
    let course = state.catalog_service.get_course(course_id).await?;

    Ok(Json(SuccessResponse::new(course)))
}

/// GET /api/v1/courses/{course_id}/support-options
#[instrument(skip(state))]
pub async fn get_support_options(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Query(query): Query<SupportOptionsQuery>,
) -> Result<Json<CourseSupportOptionsResponse>> {
    let options = state
        .catalog_service
        .get_course_support_options(course_id, query.student_id)
        .await?;

    Ok(Json(SuccessResponse::new(CourseSupportOptionsData::from(
        options,
    ))))
}

/// GET /api/v1/tas
#[instrument(skip(state))]
pub async fn list_tas(State(state): State<AppState>) -> Result<Json<TaListResponse>> {
    let tas = state.catalog_service.list_tas().await?;

    Ok(Json(SuccessResponse::new(tas)))
}
