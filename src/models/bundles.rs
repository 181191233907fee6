use entity::sea_orm_active_enums::CoverageType;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::common::SuccessResponse;

/// Request to purchase a session bundle
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseBundleRequest {
    pub student_id: Uuid,

    pub course_id: Uuid,

    pub product_id: Uuid,

    pub coverage_type: CoverageType,

    #[validate(range(min = 1))]
    pub total_sessions: i32,

    pub valid_from: time::OffsetDateTime,

    pub valid_to: time::OffsetDateTime,
}

pub type BundleResponse = SuccessResponse<entity::bundle_purchases::Model>;
pub type BundleListResponse = SuccessResponse<Vec<entity::bundle_purchases::Model>>;
