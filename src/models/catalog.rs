use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::SuccessResponse;
use crate::services::catalog_service::CourseSupportOptions;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportOptionsQuery {
    pub student_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSupportOptionsData {
    pub course: entity::courses::Model,
    pub products: Vec<entity::products::Model>,
    pub tas: Vec<entity::tas::Model>,
    pub group_session_templates: Vec<entity::group_session_templates::Model>,
    pub active_student_bundles: Vec<entity::bundle_purchases::Model>,
}

impl From<CourseSupportOptions> for CourseSupportOptionsData {
    fn from(options: CourseSupportOptions) -> Self {
        Self {
            course: options.course,
            products: options.products,
            tas: options.tas,
            group_session_templates: options.group_session_templates,
            active_student_bundles: options.active_student_bundles,
        }
    }
}

pub type CourseResponse = SuccessResponse<entity::courses::Model>;
pub type CourseListResponse = SuccessResponse<Vec<entity::courses::Model>>;
pub type TaListResponse = SuccessResponse<Vec<entity::tas::Model>>;
pub type CourseSupportOptionsResponse = SuccessResponse<CourseSupportOptionsData>;
