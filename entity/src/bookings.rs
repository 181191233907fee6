use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BookingStatus, SessionType};

/// A concrete session on a TA's calendar.
///
/// `price_per_student` is a snapshot taken at creation time; it is 0 when the
/// booking was paid with a bundle or with credits. `credits_spent` records the
/// wallet deduction so cancellation can refund it exactly once. `slot_id` ties
/// slot-flow bookings to the ad-hoc availability row whose seat they hold.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub ta_id: Uuid,
    pub status: BookingStatus,
    pub session_type: SessionType,
    pub date: TimeDateTimeWithTimeZone,
    pub duration_minutes: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price_per_student: Decimal,
    pub credits_spent: i32,
    pub group_session_template_id: Option<Uuid>,
    pub bundle_purchase_id: Option<Uuid>,
    pub slot_id: Option<Uuid>,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking_students::Entity")]
    BookingStudents,
    #[sea_orm(
        belongs_to = "super::bundle_purchases::Entity",
        from = "Column::BundlePurchaseId",
        to = "super::bundle_purchases::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    BundlePurchases,
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Courses,
    #[sea_orm(
        belongs_to = "super::group_session_templates::Entity",
        from = "Column::GroupSessionTemplateId",
        to = "super::group_session_templates::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    GroupSessionTemplates,
    #[sea_orm(
        belongs_to = "super::ta_availability::Entity",
        from = "Column::SlotId",
        to = "super::ta_availability::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    TaAvailability,
    #[sea_orm(
        belongs_to = "super::tas::Entity",
        from = "Column::TaId",
        to = "super::tas::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Tas,
}

impl Related<super::booking_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingStudents.def()
    }
}

impl Related<super::bundle_purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BundlePurchases.def()
    }
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl Related<super::group_session_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupSessionTemplates.def()
    }
}

impl Related<super::ta_availability::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaAvailability.def()
    }
}

impl Related<super::tas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
