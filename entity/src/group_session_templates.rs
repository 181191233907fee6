use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recurring weekly group-session pattern. Concrete occurrences are
/// materialized as GROUP bookings referencing this template.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_session_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ta_id: Uuid,
    pub course_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
    pub capacity: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price_per_student: Decimal,
    pub is_active: bool,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
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
