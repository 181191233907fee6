use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A teaching assistant profile.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub degree: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub gpa: Option<f64>,
    pub bio: Option<String>,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::course_tas::Entity")]
    CourseTas,
    #[sea_orm(has_many = "super::group_session_templates::Entity")]
    GroupSessionTemplates,
    #[sea_orm(has_many = "super::ta_availability::Entity")]
    TaAvailability,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::course_tas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseTas.def()
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

impl ActiveModelBehavior for ActiveModel {}
