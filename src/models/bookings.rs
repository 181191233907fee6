use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::common::SuccessResponse;
use crate::services::booking_service::BookingSummary;

/// Request to create a one-off individual booking
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndividualBookingRequest {
    pub student_id: Uuid,

    pub course_id: Uuid,

    pub ta_id: Option<Uuid>,

    pub date: time::OffsetDateTime,

    #[validate(range(min = 1))]
    pub duration_minutes: i32,

    pub bundle_purchase_id: Option<Uuid>,

    #[serde(default)]
    pub pay_with_credits: bool,
}

/// Request to take one seat on an ad-hoc availability slot
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSlotRequest {
    pub student_id: Uuid,

    pub bundle_purchase_id: Option<Uuid>,

    #[serde(default)]
    pub pay_with_credits: bool,
}

/// A booking with its live participant count
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummaryData {
    #[serde(flatten)]
    pub booking: entity::bookings::Model,
    pub student_count: i64,
}

impl From<BookingSummary> for BookingSummaryData {
    fn from(summary: BookingSummary) -> Self {
        Self {
            booking: summary.booking,
            student_count: summary.student_count,
        }
    }
}

pub type BookingResponse = SuccessResponse<entity::bookings::Model>;
pub type BookingListResponse = SuccessResponse<Vec<BookingSummaryData>>;
