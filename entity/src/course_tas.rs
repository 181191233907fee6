use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join table linking a TA to a course they support. Created explicitly or as
/// a side effect of a TA publishing availability for the course.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course_tas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub course_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub ta_id: Uuid,
    pub created_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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
