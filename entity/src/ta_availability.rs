use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A TA-declared one-off open time window with a seat capacity.
///
/// Invariant: `0 <= booked_count <= capacity`. Once bookings exist against a
/// slot it is soft-disabled (`is_active = false`) instead of deleted; hard
/// deletion is only allowed while `booked_count == 0`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ta_availability")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ta_id: Uuid,
    pub course_id: Uuid,
    pub date: TimeDate,
    /// 24-hour `HH:mm`.
    pub start_time: String,
    /// 24-hour `HH:mm`.
    pub end_time: String,
    pub capacity: i32,
    pub booked_count: i32,
    pub is_active: bool,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

impl Model {
    pub fn available_seats(&self) -> i32 {
        self.capacity - self.booked_count
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Courses,
    #[sea_orm(
        belongs_to = "super::tas::Entity",
        from = "Column::TaId",
        to = "super::tas::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Tas,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl Related<super::tas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
