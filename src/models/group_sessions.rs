use entity::sea_orm_active_enums::BookingStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::common::SuccessResponse;
use crate::services::group_session_service::{
    CourseGroupSessions, GroupSessionOccurrence, JoinResult,
};

/// Request to declare a weekly group session template
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub course_id: Uuid,

    /// 0 = Sunday .. 6 = Saturday
    #[validate(range(min = 0, max = 6))]
    pub day_of_week: i16,

    #[validate(length(min = 5, max = 5))]
    pub start_time: String,

    #[validate(length(min = 5, max = 5))]
    pub end_time: String,

    #[validate(range(min = 1))]
    pub capacity: i32,

    pub price_per_student: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializeRequest {
    /// Defaults to the configured horizon when omitted
    pub weeks_ahead: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupSessionRequest {
    pub student_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinData {
    pub booking_id: Uuid,
    pub student_count: i64,
    pub status: BookingStatus,
}

impl From<JoinResult> for JoinData {
    fn from(result: JoinResult) -> Self {
        Self {
            booking_id: result.booking.id,
            student_count: result.student_count,
            status: result.booking.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSessionOccurrenceData {
    #[serde(flatten)]
    pub booking: entity::bookings::Model,
    pub student_count: i64,
    pub effective_status: BookingStatus,
    pub capacity: i32,
}

impl From<GroupSessionOccurrence> for GroupSessionOccurrenceData {
    fn from(occurrence: GroupSessionOccurrence) -> Self {
        Self {
            booking: occurrence.booking,
            student_count: occurrence.student_count,
            effective_status: occurrence.effective_status,
            capacity: occurrence.capacity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGroupSessionsData {
    pub template: entity::group_session_templates::Model,
    pub occurrences: Vec<GroupSessionOccurrenceData>,
}

impl From<CourseGroupSessions> for CourseGroupSessionsData {
    fn from(sessions: CourseGroupSessions) -> Self {
        Self {
            template: sessions.template,
            occurrences: sessions
                .occurrences
                .into_iter()
                .map(GroupSessionOccurrenceData::from)
                .collect(),
        }
    }
}

pub type TemplateResponse = SuccessResponse<entity::group_session_templates::Model>;
pub type MaterializeResponse = SuccessResponse<Vec<entity::bookings::Model>>;
pub type JoinResponse = SuccessResponse<JoinData>;
pub type CourseGroupSessionsResponse = SuccessResponse<Vec<CourseGroupSessionsData>>;
