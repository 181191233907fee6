use crate::error::{ApiError, Result};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use tracing::instrument;
use uuid::Uuid;

/// Read-side catalog projections: courses, TAs and the combined
/// support-options view a student sees for a course. Plain joins, no writes.
pub struct CatalogService {
    db: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct CourseSupportOptions {
    pub course: entity::courses::Model,
    pub products: Vec<entity::products::Model>,
    pub tas: Vec<entity::tas::Model>,
    pub group_session_templates: Vec<entity::group_session_templates::Model>,
    pub active_student_bundles: Vec<entity::bundle_purchases::Model>,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_courses(&self) -> Result<Vec<entity::courses::Model>> {
        let courses = entity::courses::Entity::find()
            .order_by_asc(entity::courses::Column::Code)
            .all(&self.db)
            .await?;

        Ok(courses)
    }

    #[instrument(skip(self))]
    pub async fn get_course(&self, course_id: Uuid) -> Result<entity::courses::Model> {
        entity::courses::Entity::find_by_id(course_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_tas(&self) -> Result<Vec<entity::tas::Model>> {
        let tas = entity::tas::Entity::find()
            .order_by_asc(entity::tas::Column::Name)
            .all(&self.db)
            .await?;

        Ok(tas)
    }

    /// Everything a student needs to pick a support option for a course:
    /// products, linked TAs, active group templates and (when asked for a
    /// specific student) their bundles currently in validity.
    #[instrument(skip(self))]
    pub async fn get_course_support_options(
        &self,
        course_id: Uuid,
        student_id: Option<Uuid>,
    ) -> Result<CourseSupportOptions> {
        let course = self.get_course(course_id).await?;

        let products = entity::products::Entity::find()
            .filter(entity::products::Column::CourseId.eq(course_id))
            .filter(entity::products::Column::IsActive.eq(true))
            .all(&self.db)
            .await?;

        let links = entity::course_tas::Entity::find()
            .filter(entity::course_tas::Column::CourseId.eq(course_id))
            .all(&self.db)
            .await?;
        let ta_ids: Vec<Uuid> = links.iter().map(|link| link.ta_id).collect();
        let tas = entity::tas::Entity::find()
            .filter(entity::tas::Column::Id.is_in(ta_ids))
            .all(&self.db)
            .await?;

        let group_session_templates = entity::group_session_templates::Entity::find()
            .filter(entity::group_session_templates::Column::CourseId.eq(course_id))
            .filter(entity::group_session_templates::Column::IsActive.eq(true))
            .all(&self.db)
            .await?;

        let active_student_bundles = match student_id {
            Some(student_id) => {
                let now = time::OffsetDateTime::now_utc();
                entity::bundle_purchases::Entity::find()
                    .filter(entity::bundle_purchases::Column::StudentId.eq(student_id))
                    .filter(entity::bundle_purchases::Column::CourseId.eq(course_id))
                    .filter(entity::bundle_purchases::Column::ValidFrom.lte(now))
                    .filter(entity::bundle_purchases::Column::ValidTo.gte(now))
                    .all(&self.db)
                    .await?
            }
            None => Vec::new(),
        };

        Ok(CourseSupportOptions {
            course,
            products,
            tas,
            group_session_templates,
            active_student_bundles,
        })
    }
}
