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
        bookings::{
            BookSlotRequest, BookingListResponse, BookingResponse, BookingSummaryData,
            CreateIndividualBookingRequest,
        },
        common::SuccessResponse,
    },
    services::booking_service::NewIndividualBooking,
};

/// POST /api/v1/bookings/individual
#[instrument(skip(state, request))]
pub async fn create_individual_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateIndividualBookingRequest>,
) -> Result<Json<BookingResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let booking = state
        .booking_service
        .create_individual_booking(NewIndividualBooking {
            student_id: request.student_id,
            course_id: request.course_id,
            ta_id: request.ta_id,
            date: request.date,
            duration_minutes: request.duration_minutes,
            bundle_purchase_id: request.bundle_purchase_id,
            pay_with_credits: request.pay_with_credits,
        })
        .await?;

    Ok(Json(SuccessResponse::new(booking)))
}

/// POST /api/v1/availability/{slot_id}/bookings
#[instrument(skip(state, request))]
pub async fn book_slot(
    State(state): State<AppState>,
    Path(slot_id): Path<Uuid>,
    Json(request): Json<BookSlotRequest>,
) -> Result<Json<BookingResponse>> {
    let booking = state
        .booking_service
        .book_slot(
            slot_id,
            request.student_id,
            request.bundle_purchase_id,
            request.pay_with_credits,
        )
        .await?;

    Ok(Json(SuccessResponse::new(booking)))
}

/// PATCH /api/v1/bookings/{id}/cancel
#[instrument(skip(state))]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>> {
    let cancelled = state.booking_service.cancel_booking(booking_id).await?;

    Ok(Json(SuccessResponse::new(cancelled)))
}

/// PATCH /api/v1/bookings/{id}/cancel-slot
#[instrument(skip(state))]
pub async fn cancel_slot_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>> {
    let cancelled = state
        .booking_service
        .cancel_slot_booking(booking_id)
        .await?;

    Ok(Json(SuccessResponse::new(cancelled)))
}

/// GET /api/v1/bookings/students/{student_id}
#[instrument(skip(state))]
pub async fn get_student_bookings(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<BookingListResponse>> {
    let bookings = state
        .booking_service
        .get_student_bookings(student_id)
        .await?;

    Ok(Json(SuccessResponse::new(
        bookings.into_iter().map(BookingSummaryData::from).collect(),
    )))
}

/// GET /api/v1/bookings/tas/{ta_id}
#[instrument(skip(state))]
pub async fn get_ta_bookings(
    State(state): State<AppState>,
    Path(ta_id): Path<Uuid>,
) -> Result<Json<BookingListResponse>> {
    let bookings = state.booking_service.get_ta_bookings(ta_id).await?;

    Ok(Json(SuccessResponse::new(
        bookings.into_iter().map(BookingSummaryData::from).collect(),
    )))
}
