use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub description: Option<String>,
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
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
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

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::ta_availability::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaAvailability.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
