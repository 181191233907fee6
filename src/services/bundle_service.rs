use crate::error::{ApiError, Result};
use anyhow::anyhow;
use entity::sea_orm_active_enums::{CoverageType, ProductType};
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

/// Bundle purchases: prepaid session blocks. The (student, course, product)
/// unique index is the duplicate-purchase guard; the insert goes through
/// ON CONFLICT DO NOTHING and a read-back so concurrent purchases race
/// safely — the loser sees a row it did not insert and gets a Conflict.
pub struct BundleService {
    db: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct NewBundlePurchase {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub product_id: Uuid,
    pub coverage_type: CoverageType,
    pub total_sessions: i32,
    pub valid_from: time::OffsetDateTime,
    pub valid_to: time::OffsetDateTime,
}

impl BundleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn purchase_bundle(
        &self,
        purchase: NewBundlePurchase,
    ) -> Result<entity::bundle_purchases::Model> {
        if purchase.total_sessions < 1 {
            return Err(ApiError::BadRequest(
                "totalSessions must be at least 1".to_string(),
            ));
        }
        if purchase.valid_from >= purchase.valid_to {
            return Err(ApiError::BadRequest(
                "validFrom must be before validTo".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        entity::students::Entity::find_by_id(purchase.student_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Student {} not found", purchase.student_id))
            })?;

        entity::courses::Entity::find_by_id(purchase.course_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Course {} not found", purchase.course_id))
            })?;

        let product = entity::products::Entity::find_by_id(purchase.product_id)
            .one(&txn)
            .await?
            .filter(|p| p.course_id == purchase.course_id)
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "Product {} not found for this course",
                    purchase.product_id
                ))
            })?;

        if product.product_type == ProductType::IndividualSession {
            return Err(ApiError::BadRequest(
                "This product is not a bundle".to_string(),
            ));
        }

        let now = time::OffsetDateTime::now_utc();
        let purchase_id = Uuid::new_v4();
        let row = entity::bundle_purchases::ActiveModel {
            id: Set(purchase_id),
            student_id: Set(purchase.student_id),
            course_id: Set(purchase.course_id),
            product_id: Set(purchase.product_id),
            coverage_type: Set(purchase.coverage_type),
            total_sessions: Set(purchase.total_sessions),
            remaining_sessions: Set(purchase.total_sessions),
            valid_from: Set(purchase.valid_from),
            valid_to: Set(purchase.valid_to),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // Insert atomically; if the (student, course, product) tuple already
        // exists, do nothing instead of erroring
        entity::bundle_purchases::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    entity::bundle_purchases::Column::StudentId,
                    entity::bundle_purchases::Column::CourseId,
                    entity::bundle_purchases::Column::ProductId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&txn)
            .await?;

        // Check whether this purchase was inserted or already existed
        let persisted = entity::bundle_purchases::Entity::find()
            .filter(entity::bundle_purchases::Column::StudentId.eq(purchase.student_id))
            .filter(entity::bundle_purchases::Column::CourseId.eq(purchase.course_id))
            .filter(entity::bundle_purchases::Column::ProductId.eq(purchase.product_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(anyhow!(
                    "Failed to read bundle purchase after insert for student {}",
                    purchase.student_id
                ))
            })?;

        if persisted.id != purchase_id {
            // Another purchase already claimed the tuple — even an exhausted
            // or expired one blocks a repurchase
            txn.rollback().await?;
            return Err(ApiError::Conflict(
                "This student already has this bundle product".to_string(),
            ));
        }

        txn.commit().await?;

        info!(
            "Recorded bundle purchase {} for student {} ({} sessions)",
            persisted.id, purchase.student_id, persisted.total_sessions
        );

        Ok(persisted)
    }

    #[instrument(skip(self))]
    pub async fn get_student_bundles(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<entity::bundle_purchases::Model>> {
        entity::students::Entity::find_by_id(student_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;

        let bundles = entity::bundle_purchases::Entity::find()
            .filter(entity::bundle_purchases::Column::StudentId.eq(student_id))
            .order_by_desc(entity::bundle_purchases::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(bundles)
    }

    /// Bundles currently inside their validity window for one course.
    #[instrument(skip(self))]
    pub async fn get_active_bundles(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<entity::bundle_purchases::Model>> {
        let now = time::OffsetDateTime::now_utc();

        let bundles = entity::bundle_purchases::Entity::find()
            .filter(entity::bundle_purchases::Column::StudentId.eq(student_id))
            .filter(entity::bundle_purchases::Column::CourseId.eq(course_id))
            .filter(entity::bundle_purchases::Column::ValidFrom.lte(now))
            .filter(entity::bundle_purchases::Column::ValidTo.gte(now))
            .order_by_desc(entity::bundle_purchases::Column::ValidTo)
            .all(&self.db)
            .await?;

        Ok(bundles)
    }
}
