use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::common::SuccessResponse;

/// Request to publish a new availability slot
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAvailabilityRequest {
    pub course_id: Uuid,

    /// Calendar date, `YYYY-MM-DD`
    #[validate(length(min = 10, max = 10))]
    pub date: String,

    /// 24-hour `HH:mm`
    #[validate(length(min = 5, max = 5))]
    pub start_time: String,

    /// 24-hour `HH:mm`
    #[validate(length(min = 5, max = 5))]
    pub end_time: String,

    #[validate(range(min = 1))]
    pub capacity: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvailabilityRequest {
    #[validate(length(min = 5, max = 5))]
    pub start_time: Option<String>,

    #[validate(length(min = 5, max = 5))]
    pub end_time: Option<String>,

    #[validate(range(min = 1))]
    pub capacity: Option<i32>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRemovalData {
    /// true when the row was deleted; false when it was soft-disabled
    /// because seats were already booked against it
    pub deleted: bool,
}

pub type SlotResponse = SuccessResponse<entity::ta_availability::Model>;
pub type SlotListResponse = SuccessResponse<Vec<entity::ta_availability::Model>>;
pub type SlotRemovalResponse = SuccessResponse<SlotRemovalData>;
